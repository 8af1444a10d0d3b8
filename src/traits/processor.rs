// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::engine::context::PipelineContext;
use crate::errors::PipelineError;

/// A stream of events, with failures carried on the same channel.
pub type EventStream<E> = BoxStream<'static, Result<E, PipelineError>>;

/// Identifies where a processor lives, e.g. `orders-flow/processors/2`.
///
/// Reported to profiling data producers so observations can be attributed
/// to a processor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentLocation(String);

impl ComponentLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentLocation {
    fn from(location: &str) -> Self {
        Self::new(location)
    }
}

/// A reactive transformation from an event stream to an event stream.
///
/// This is the unit a processing strategy wraps. `apply` only builds the
/// stream; no work happens until the returned stream is polled.
pub trait Processor<E>: Send + Sync {
    fn apply(&self, events: EventStream<E>, context: &PipelineContext) -> EventStream<E>;

    fn location(&self) -> &ComponentLocation;
}

impl<E, P> Processor<E> for Arc<P>
where
    P: Processor<E> + ?Sized,
{
    fn apply(&self, events: EventStream<E>, context: &PipelineContext) -> EventStream<E> {
        (**self).apply(events, context)
    }

    fn location(&self) -> &ComponentLocation {
        (**self).location()
    }
}

/// A processor that handles one event at a time.
///
/// Wrap it in `PerEventProcessor` to use it where a `Processor` is expected.
#[async_trait]
pub trait EventProcessor<E>: Send + Sync {
    async fn process(&self, event: E, context: &PipelineContext) -> Result<E, PipelineError>;

    fn location(&self) -> &ComponentLocation;
}

/// Lifts an `EventProcessor` into a stream `Processor`.
///
/// Events are processed strictly in order; failures coming from upstream
/// pass through untouched.
pub struct PerEventProcessor<P> {
    inner: Arc<P>,
}

impl<P> PerEventProcessor<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<E, P> Processor<E> for PerEventProcessor<P>
where
    E: Send + 'static,
    P: EventProcessor<E> + 'static,
{
    fn apply(&self, events: EventStream<E>, context: &PipelineContext) -> EventStream<E> {
        let inner = self.inner.clone();
        let context = context.clone();
        events
            .and_then(move |event| {
                let inner = inner.clone();
                let context = context.clone();
                async move { inner.process(event, &context).await }
            })
            .boxed()
    }

    fn location(&self) -> &ComponentLocation {
        self.inner.location()
    }
}

/// A processor built from an async closure, mostly for tests and demos.
pub struct FnProcessor<F> {
    location: ComponentLocation,
    f: Arc<F>,
}

impl<F> FnProcessor<F> {
    pub fn new(location: impl Into<ComponentLocation>, f: F) -> Self {
        Self {
            location: location.into(),
            f: Arc::new(f),
        }
    }
}

impl<E, F, Fut> Processor<E> for FnProcessor<F>
where
    E: Send + 'static,
    F: Fn(E, PipelineContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<E, PipelineError>> + Send + 'static,
{
    fn apply(&self, events: EventStream<E>, context: &PipelineContext) -> EventStream<E> {
        let f = self.f.clone();
        let context = context.clone();
        events
            .and_then(move |event| (*f)(event, context.clone()))
            .boxed()
    }

    fn location(&self) -> &ComponentLocation {
        &self.location
    }
}

/// A processor that expands every event into a stream of events.
///
/// The per-event streams are concatenated in upstream order. A failure
/// inside one of them is passed on like any other item.
pub struct FlatMapProcessor<F> {
    location: ComponentLocation,
    f: Arc<F>,
}

impl<F> FlatMapProcessor<F> {
    pub fn new(location: impl Into<ComponentLocation>, f: F) -> Self {
        Self {
            location: location.into(),
            f: Arc::new(f),
        }
    }
}

impl<E, F> Processor<E> for FlatMapProcessor<F>
where
    E: Send + 'static,
    F: Fn(E, PipelineContext) -> EventStream<E> + Send + Sync + 'static,
{
    fn apply(&self, events: EventStream<E>, context: &PipelineContext) -> EventStream<E> {
        let f = self.f.clone();
        let context = context.clone();
        events
            .map_ok(move |event| (*f)(event, context.clone()))
            .try_flatten()
            .boxed()
    }

    fn location(&self) -> &ComponentLocation {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    struct Doubler {
        location: ComponentLocation,
    }

    #[async_trait]
    impl EventProcessor<u32> for Doubler {
        async fn process(&self, event: u32, _context: &PipelineContext) -> Result<u32, PipelineError> {
            Ok(event * 2)
        }

        fn location(&self) -> &ComponentLocation {
            &self.location
        }
    }

    #[tokio::test]
    async fn per_event_processor_maps_in_order() {
        let processor = PerEventProcessor::new(Doubler {
            location: "flow/processors/0".into(),
        });
        let input = stream::iter(vec![Ok(1u32), Ok(2), Ok(3)]).boxed();

        let output: Vec<_> = processor
            .apply(input, &PipelineContext::new())
            .collect()
            .await;

        assert_eq!(output, vec![Ok(2), Ok(4), Ok(6)]);
        assert_eq!(Processor::<u32>::location(&processor).as_str(), "flow/processors/0");
    }

    #[tokio::test]
    async fn fn_processor_passes_upstream_errors_through() {
        let processor = FnProcessor::new("flow/processors/1", |event: u32, _ctx: PipelineContext| async move {
            Ok::<_, PipelineError>(event + 1)
        });
        let upstream_error = PipelineError::processor_failed("upstream", "boom");
        let input = stream::iter(vec![Ok(1u32), Err(upstream_error.clone()), Ok(5)]).boxed();

        let output: Vec<_> = processor
            .apply(input, &PipelineContext::new())
            .collect()
            .await;

        assert_eq!(output, vec![Ok(2), Err(upstream_error), Ok(6)]);
    }

    #[tokio::test]
    async fn flat_map_processor_concatenates_in_upstream_order() {
        let processor = FlatMapProcessor::new("flow/processors/2", |event: u32, _ctx: PipelineContext| {
            stream::iter((0..event).map(move |i| Ok::<_, PipelineError>(event * 10 + i))).boxed()
        });
        let input = stream::iter(vec![Ok(1u32), Ok(0), Ok(3)]).boxed();

        let output: Vec<_> = processor
            .apply(input, &PipelineContext::new())
            .collect()
            .await;

        assert_eq!(output, vec![Ok(10), Ok(30), Ok(31), Ok(32)]);
    }

    #[tokio::test]
    async fn flat_map_processor_passes_inner_failures_on() {
        let processor = FlatMapProcessor::new("flow/processors/3", |event: u32, _ctx: PipelineContext| {
            stream::iter(vec![
                Ok(event),
                Err(PipelineError::processor_failed("flow/processors/3", "split")),
            ])
            .boxed()
        });
        let input = stream::iter(vec![Ok(7u32)]).boxed();

        let output: Vec<_> = processor
            .apply(input, &PipelineContext::new())
            .collect()
            .await;

        assert_eq!(
            output,
            vec![Ok(7), Err(PipelineError::processor_failed("flow/processors/3", "split"))]
        );
    }
}
