// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scheduler handoffs and worker pool lifecycle.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A handoff task was submitted to a scheduler.
///
/// # Log Level
/// `trace!` - Emitted once per handoff, which may be once per event
pub struct HandoffSubmitted<'a> {
    pub scheduler: &'a str,
}

impl Display for HandoffSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Handoff submitted to scheduler '{}'", self.scheduler)
    }
}

impl StructuredLog for HandoffSubmitted<'_> {
    fn log(&self) {
        tracing::trace!(scheduler = self.scheduler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("handoff", span_name = name, scheduler = self.scheduler)
    }
}

/// A scheduler refused a handoff.
///
/// # Log Level
/// `warn!` - The affected event path terminates with an error
///
/// # Example
/// ```
/// use strategy_pipeline::errors::SchedulerError;
/// use strategy_pipeline::observability::messages::scheduler::SchedulerRejected;
///
/// let error = SchedulerError::ShutDown;
/// let msg = SchedulerRejected {
///     scheduler: "io",
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Scheduler 'io' rejected handoff: scheduler is shut down");
/// ```
pub struct SchedulerRejected<'a> {
    pub scheduler: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SchedulerRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduler '{}' rejected handoff: {}",
            self.scheduler, self.error
        )
    }
}

impl StructuredLog for SchedulerRejected<'_> {
    fn log(&self) {
        tracing::warn!(scheduler = self.scheduler, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "scheduler_rejected",
            span_name = name,
            scheduler = self.scheduler,
            error = %self.error,
        )
    }
}

/// A handoff task stopped because its consumer went away.
///
/// # Log Level
/// `debug!` - Normal outcome of cancelling a stream
pub struct HandoffCancelled<'a> {
    pub scheduler: &'a str,
    pub delivered: usize,
}

impl Display for HandoffCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handoff on scheduler '{}' cancelled after delivering {} items",
            self.scheduler, self.delivered
        )
    }
}

impl StructuredLog for HandoffCancelled<'_> {
    fn log(&self) {
        tracing::debug!(
            scheduler = self.scheduler,
            delivered = self.delivered,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "handoff_cancelled",
            span_name = name,
            scheduler = self.scheduler,
            delivered = self.delivered,
        )
    }
}

/// A worker pool was started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use strategy_pipeline::observability::messages::scheduler::WorkerPoolStarted;
///
/// let msg = WorkerPoolStarted {
///     name: "io",
///     worker_threads: 4,
///     capacity: Some(64),
/// };
///
/// assert_eq!(msg.to_string(), "Worker pool 'io' started: 4 worker threads, capacity=64");
/// ```
pub struct WorkerPoolStarted<'a> {
    pub name: &'a str,
    pub worker_threads: usize,
    pub capacity: Option<usize>,
}

impl Display for WorkerPoolStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.capacity {
            Some(capacity) => write!(
                f,
                "Worker pool '{}' started: {} worker threads, capacity={}",
                self.name, self.worker_threads, capacity
            ),
            None => write!(
                f,
                "Worker pool '{}' started: {} worker threads, unbounded",
                self.name, self.worker_threads
            ),
        }
    }
}

impl StructuredLog for WorkerPoolStarted<'_> {
    fn log(&self) {
        tracing::info!(
            pool = self.name,
            worker_threads = self.worker_threads,
            capacity = ?self.capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_pool",
            span_name = name,
            pool = self.name,
            worker_threads = self.worker_threads,
        )
    }
}

/// A worker pool was shut down by its owner.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use strategy_pipeline::observability::messages::scheduler::WorkerPoolShutdown;
///
/// let msg = WorkerPoolShutdown { name: "io" };
/// assert_eq!(msg.to_string(), "Worker pool 'io' shut down");
/// ```
pub struct WorkerPoolShutdown<'a> {
    pub name: &'a str,
}

impl Display for WorkerPoolShutdown<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker pool '{}' shut down", self.name)
    }
}

impl StructuredLog for WorkerPoolShutdown<'_> {
    fn log(&self) {
        tracing::info!(pool = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_pool_shutdown", span_name = name, pool = self.name)
    }
}
