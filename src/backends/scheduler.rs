// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tokio-backed schedulers.
//!
//! A `WorkerPool` owns a multi-threaded tokio runtime. Pipelines never see the
//! pool itself, only the `SchedulerHandle` it hands out, so the owner alone
//! decides when the pool stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::Semaphore;

use crate::errors::{ConfigError, SchedulerError};
use crate::observability::messages::scheduler::{WorkerPoolShutdown, WorkerPoolStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{Scheduler, SchedulerHandle, Task};

/// Submits tasks to a tokio runtime.
///
/// With a capacity set, at most `capacity` submitted tasks may be
/// outstanding; further submissions fail with `SchedulerError::Saturated`
/// instead of queueing.
pub struct RuntimeScheduler {
    name: String,
    handle: Handle,
    permits: Option<(Arc<Semaphore>, usize)>,
    shut_down: AtomicBool,
}

impl RuntimeScheduler {
    /// Wrap an existing runtime, e.g. the one driving the current test.
    pub fn from_handle(name: impl Into<String>, handle: Handle, capacity: Option<usize>) -> Self {
        Self {
            name: name.into(),
            handle,
            permits: capacity.map(|capacity| (Arc::new(Semaphore::new(capacity)), capacity)),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Number of submitted tasks that have not finished yet. Only tracked
    /// when a capacity is set.
    pub fn outstanding(&self) -> Option<usize> {
        self.permits
            .as_ref()
            .map(|(semaphore, capacity)| capacity - semaphore.available_permits())
    }

    fn mark_shut_down(&self) {
        self.shut_down.store(true, Ordering::Release);
    }
}

impl Scheduler for RuntimeScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, task: Task) -> Result<(), SchedulerError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }

        let permit = match &self.permits {
            Some((semaphore, capacity)) => Some(
                semaphore
                    .clone()
                    .try_acquire_owned()
                    .map_err(|_| SchedulerError::Saturated {
                        capacity: *capacity,
                    })?,
            ),
            None => None,
        };

        self.handle.spawn(async move {
            let _permit = permit;
            task.await;
        });
        Ok(())
    }
}

/// A named pool of worker threads.
pub struct WorkerPool {
    name: String,
    runtime: Option<Runtime>,
    scheduler: Arc<RuntimeScheduler>,
}

impl WorkerPool {
    /// Start a pool whose threads are named `<name>-worker`.
    pub fn new(
        name: impl Into<String>,
        worker_threads: usize,
        capacity: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name(format!("{}-worker", name))
            .enable_all()
            .build()
            .map_err(|source| ConfigError::WorkerPoolStart {
                name: name.clone(),
                source,
            })?;

        let scheduler = Arc::new(RuntimeScheduler::from_handle(
            name.clone(),
            runtime.handle().clone(),
            capacity,
        ));

        WorkerPoolStarted {
            name: &name,
            worker_threads,
            capacity,
        }
        .log();

        Ok(Self {
            name,
            runtime: Some(runtime),
            scheduler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A non-owning handle for pipelines.
    pub fn handle(&self) -> SchedulerHandle {
        self.scheduler.clone()
    }

    pub fn scheduler(&self) -> &RuntimeScheduler {
        &self.scheduler
    }

    /// Stop accepting work and tear the runtime down without blocking.
    ///
    /// Handles keep working as values, but every later submission is
    /// rejected with `SchedulerError::ShutDown`.
    pub fn shutdown(&mut self) {
        self.scheduler.mark_shut_down();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            WorkerPoolShutdown { name: &self.name }.log();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::fmt;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{self, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Collects the `pool` field of every logged event.
    struct PoolFields(Arc<Mutex<Vec<String>>>);

    struct PoolVisitor<'a>(&'a mut Vec<String>);

    impl Visit for PoolVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "pool" {
                self.0.push(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
    }

    impl<S: Subscriber> Layer<S> for PoolFields {
        fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
            let mut pools = self.0.lock().unwrap();
            event.record(&mut PoolVisitor(&mut *pools));
        }
    }

    #[test]
    fn start_and_shutdown_are_logged_with_the_pool_field() {
        let pools = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(PoolFields(pools.clone()));
        let _default = tracing::subscriber::set_default(subscriber);

        let mut pool = WorkerPool::new("audit", 1, None).unwrap();
        pool.shutdown();
        pool.shutdown();

        assert_eq!(*pools.lock().unwrap(), vec!["audit".to_string(), "audit".to_string()]);
    }

    #[tokio::test]
    async fn tasks_run_on_named_worker_threads() {
        let pool = WorkerPool::new("io", 2, None).unwrap();
        let (tx, rx) = oneshot::channel();

        pool.handle()
            .submit(
                async move {
                    let name = std::thread::current().name().map(str::to_string);
                    let _ = tx.send(name);
                }
                .boxed(),
            )
            .unwrap();

        assert_eq!(rx.await.unwrap().as_deref(), Some("io-worker"));
    }

    #[tokio::test]
    async fn saturated_scheduler_rejects_without_queueing() {
        let pool = WorkerPool::new("bounded", 1, Some(1)).unwrap();
        let handle = pool.handle();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        handle
            .submit(
                async move {
                    let _ = release_rx.await;
                }
                .boxed(),
            )
            .unwrap();
        assert_eq!(pool.scheduler().outstanding(), Some(1));

        let rejected = handle.submit(async {}.boxed());
        assert_eq!(rejected, Err(SchedulerError::Saturated { capacity: 1 }));

        release_tx.send(()).unwrap();
        for _ in 0..100 {
            if pool.scheduler().outstanding() == Some(0) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(handle.submit(async {}.boxed()).is_ok());
    }

    #[tokio::test]
    async fn shut_down_pool_rejects_submissions() {
        let mut pool = WorkerPool::new("retired", 1, None).unwrap();
        let handle = pool.handle();
        pool.shutdown();

        assert_eq!(handle.submit(async {}.boxed()), Err(SchedulerError::ShutDown));
        assert_eq!(handle.name(), "retired");
    }

    #[tokio::test]
    async fn unbounded_scheduler_does_not_track_outstanding() {
        let scheduler = RuntimeScheduler::from_handle("current", Handle::current(), None);
        assert_eq!(scheduler.outstanding(), None);
        assert!(scheduler.submit(async {}.boxed()).is_ok());
    }
}
