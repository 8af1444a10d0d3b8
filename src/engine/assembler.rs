// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline assembly.
//!
//! Every event passes the same fixed sequence of boundaries:
//!
//! ```text
//! PreDispatch -> [dispatch] -> PreExecution -> processor -> PostExecution
//!             -> [callback] -> PostCallback
//! ```
//!
//! `[dispatch]` and `[callback]` are scheduler handoffs and vanish when no
//! scheduler is configured. Profiling stages vanish when the service has no
//! producer for them.

use futures::future;
use futures::stream::{self, StreamExt};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::engine::context::{PipelineContext, PROCESSOR_SCHEDULER_CONTEXT_KEY};
use crate::engine::fan_out::{FanOut, SubPipeline};
use crate::engine::handoff::handoff;
use crate::engine::profiling::{profile, BoundaryProducers, ProfilingSite};
use crate::errors::FailureStrategy;
use crate::observability::profiling::ProfilingEventKind;
use crate::traits::{ComponentLocation, EventStream, Processor, ProfilingDataProducer, SchedulerHandle};

/// A built processing strategy pipeline.
///
/// Cheap to clone; clones share the same configuration. Holds no per-run
/// state, so one pipeline may be applied to any number of streams, also
/// concurrently.
pub struct ProcessingStrategyPipeline<E> {
    assembly: Arc<Assembly<E>>,
}

impl<E> Clone for ProcessingStrategyPipeline<E> {
    fn clone(&self) -> Self {
        Self {
            assembly: self.assembly.clone(),
        }
    }
}

pub(crate) struct Assembly<E> {
    pub(crate) processor: Arc<dyn Processor<E>>,
    pub(crate) context_scheduler: SchedulerHandle,
    pub(crate) dispatch_scheduler: Option<SchedulerHandle>,
    pub(crate) callback_scheduler: Option<SchedulerHandle>,
    pub(crate) producers: BoundaryProducers,
    pub(crate) site: Arc<ProfilingSite>,
    pub(crate) parallelism: NonZeroUsize,
    pub(crate) failure_strategy: FailureStrategy,
}

impl<E: Send + 'static> ProcessingStrategyPipeline<E> {
    pub(crate) fn from_assembly(assembly: Assembly<E>) -> Self {
        Self {
            assembly: Arc::new(assembly),
        }
    }

    pub fn parallelism(&self) -> usize {
        self.assembly.parallelism.get()
    }

    pub fn failure_strategy(&self) -> FailureStrategy {
        self.assembly.failure_strategy
    }

    /// Run `upstream` through the pipeline.
    ///
    /// The processor sees `context` extended with the context scheduler under
    /// `PROCESSOR_SCHEDULER_CONTEXT_KEY`. Nothing runs until the returned
    /// stream is polled.
    pub fn apply(&self, upstream: EventStream<E>, context: &PipelineContext) -> EventStream<E> {
        let context = context.with_scheduler(
            PROCESSOR_SCHEDULER_CONTEXT_KEY,
            self.assembly.context_scheduler.clone(),
        );

        if self.assembly.parallelism.get() == 1 {
            return until_first_error(self.assembly.chain(upstream, context));
        }

        let assembly = self.assembly.clone();
        let sub_pipeline: SubPipeline<E> = Arc::new(move |event: E| {
            assembly.chain(stream::once(future::ready(Ok(event))).boxed(), context.clone())
        });
        FanOut::new(
            upstream,
            self.assembly.parallelism,
            sub_pipeline,
            self.assembly.failure_strategy,
        )
        .boxed()
    }
}

impl<E: Send + 'static> Assembly<E> {
    fn producer(&self, kind: ProfilingEventKind) -> Option<Arc<dyn ProfilingDataProducer>> {
        self.producers.get(kind).cloned()
    }

    fn stage(&self, events: EventStream<E>, kind: ProfilingEventKind) -> EventStream<E> {
        profile(events, self.producer(kind), kind, self.site.clone())
    }

    /// The boundary sequence applied to `events`.
    fn chain(self: &Arc<Self>, events: EventStream<E>, context: PipelineContext) -> EventStream<E> {
        let events = self.stage(events, ProfilingEventKind::PreDispatch);
        let assembly = self.clone();
        handoff(
            events,
            self.dispatch_scheduler.clone(),
            Box::new(move |events: EventStream<E>| {
                let events = assembly.stage(events, ProfilingEventKind::PreExecution);
                let events = assembly.processor.apply(events, &context);
                let events = assembly.stage(events, ProfilingEventKind::PostExecution);
                let callback = assembly.callback_scheduler.clone();
                handoff(
                    events,
                    callback,
                    Box::new(move |events: EventStream<E>| assembly.stage(events, ProfilingEventKind::PostCallback)),
                )
            }),
        )
    }
}

/// Pass items through up to and including the first error.
///
/// The inner stream is dropped together with the error, so nothing upstream
/// is polled again and in-flight handoff tasks are cancelled.
fn until_first_error<E: Send + 'static>(events: EventStream<E>) -> EventStream<E> {
    stream::unfold(Some(events), |events| async move {
        let mut events = events?;
        let item = events.next().await?;
        let rest = if item.is_err() { None } else { Some(events) };
        Some((item, rest))
    })
    .boxed()
}

impl<E: Send + 'static> Processor<E> for ProcessingStrategyPipeline<E> {
    fn apply(&self, events: EventStream<E>, context: &PipelineContext) -> EventStream<E> {
        ProcessingStrategyPipeline::apply(self, events, context)
    }

    fn location(&self) -> &ComponentLocation {
        self.assembly.processor.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn until_first_error_stops_after_the_failure() {
        let events = stream::iter(vec![
            Ok(1u32),
            Err(PipelineError::processor_failed("p", "first")),
            Ok(2),
            Err(PipelineError::processor_failed("p", "second")),
        ])
        .boxed();

        let output: Vec<_> = until_first_error(events).collect().await;

        assert_eq!(
            output,
            vec![Ok(1), Err(PipelineError::processor_failed("p", "first"))]
        );
    }

    #[tokio::test]
    async fn until_first_error_passes_clean_streams_through() {
        let events = stream::iter((0..5u32).map(Ok)).boxed();
        let output: Vec<_> = until_first_error(events).collect().await;
        assert_eq!(output.len(), 5);
    }

    #[tokio::test]
    async fn until_first_error_never_polls_past_the_failure() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let events = stream::iter(vec![
            Err(PipelineError::processor_failed("p", "first")),
            Ok(1u32),
        ])
        .chain(stream::pending())
        .inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .boxed();

        let mut output = until_first_error(events);
        assert_eq!(
            output.next().await,
            Some(Err(PipelineError::processor_failed("p", "first")))
        );
        let end = tokio::time::timeout(Duration::from_millis(200), output.next()).await;
        assert_eq!(end, Ok(None));
        assert_eq!(polled.load(Ordering::SeqCst), 1);
    }
}
