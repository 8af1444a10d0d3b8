// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded fan-out.
//!
//! Each upstream event is turned into its own sub-pipeline stream. At most
//! `limit` of them are in flight; while the limit is reached the upstream is
//! simply not polled, so excess events wait upstream rather than in a buffer
//! here. Results are yielded in completion order, not arrival order.

use futures::stream::{SelectAll, Stream, StreamExt};
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::errors::{FailureStrategy, PipelineError};
use crate::observability::messages::pipeline::{FanOutHalted, FanOutInvocationFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::EventStream;

/// Builds the per-event sub-pipeline.
pub type SubPipeline<E> = Arc<dyn Fn(E) -> EventStream<E> + Send + Sync>;

/// Runs a sub-pipeline for every upstream event, at most `limit` at a time.
///
/// Sub-pipeline failures are handled per `strategy`. An upstream failure
/// always cancels the in-flight invocations and ends the stream.
pub struct FanOut<E> {
    upstream: Option<EventStream<E>>,
    limit: usize,
    sub_pipeline: SubPipeline<E>,
    strategy: FailureStrategy,
    in_flight: SelectAll<EventStream<E>>,
    upstream_error: Option<PipelineError>,
    /// First invocation failure under `BestEffort`, emitted once drained.
    deferred_error: Option<PipelineError>,
    done: bool,
}

impl<E> Unpin for FanOut<E> {}

impl<E: Send + 'static> FanOut<E> {
    pub fn new(
        upstream: EventStream<E>,
        limit: NonZeroUsize,
        sub_pipeline: SubPipeline<E>,
        strategy: FailureStrategy,
    ) -> Self {
        Self {
            upstream: Some(upstream),
            limit: limit.get(),
            sub_pipeline,
            strategy,
            in_flight: SelectAll::new(),
            upstream_error: None,
            deferred_error: None,
            done: false,
        }
    }

    /// Number of sub-pipelines currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Pull events from upstream until the limit is reached.
    fn admit(&mut self, cx: &mut Context<'_>) {
        while self.in_flight.len() < self.limit {
            let Some(upstream) = self.upstream.as_mut() else {
                return;
            };
            match upstream.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(event))) => self.in_flight.push((self.sub_pipeline)(event)),
                Poll::Ready(Some(Err(error))) => {
                    self.upstream = None;
                    self.upstream_error = Some(error);
                    return;
                }
                Poll::Ready(None) => {
                    self.upstream = None;
                    return;
                }
                Poll::Pending => return,
            }
        }
    }

    fn cancel_in_flight(&mut self, reason: &str) {
        let cancelled = self.in_flight.len();
        self.in_flight = SelectAll::new();
        self.upstream = None;
        FanOutHalted {
            reason,
            cancelled,
            draining: 0,
        }
        .log();
    }

    fn on_invocation_failed(&mut self, error: PipelineError) -> Option<PipelineError> {
        FanOutInvocationFailed {
            strategy: strategy_name(self.strategy),
            in_flight: self.in_flight.len(),
            error: &error,
        }
        .log();

        match self.strategy {
            FailureStrategy::ContinueOnError => Some(error),
            FailureStrategy::FailFast => {
                self.cancel_in_flight("fail fast");
                self.done = true;
                Some(error)
            }
            FailureStrategy::BestEffort => {
                if self.deferred_error.is_none() {
                    self.upstream = None;
                    self.deferred_error = Some(error);
                    FanOutHalted {
                        reason: "best effort",
                        cancelled: 0,
                        draining: self.in_flight.len(),
                    }
                    .log();
                    None
                } else {
                    Some(error)
                }
            }
        }
    }
}

impl<E: Send + 'static> Stream for FanOut<E> {
    type Item = Result<E, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            this.admit(cx);
            if let Some(error) = this.upstream_error.take() {
                this.cancel_in_flight("upstream failed");
                this.done = true;
                return Poll::Ready(Some(Err(error)));
            }

            if this.in_flight.is_empty() {
                if let Some(error) = this.deferred_error.take() {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                if this.upstream.is_none() {
                    this.done = true;
                    return Poll::Ready(None);
                }
                return Poll::Pending;
            }

            match this.in_flight.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(Ok(event))),
                Poll::Ready(Some(Err(error))) => {
                    if let Some(error) = this.on_invocation_failed(error) {
                        return Poll::Ready(Some(Err(error)));
                    }
                }
                // Every in-flight invocation finished; admit more.
                Poll::Ready(None) => {}
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

fn strategy_name(strategy: FailureStrategy) -> &'static str {
    match strategy {
        FailureStrategy::FailFast => "FailFast",
        FailureStrategy::ContinueOnError => "ContinueOnError",
        FailureStrategy::BestEffort => "BestEffort",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn numbers(n: u32) -> EventStream<u32> {
        stream::iter((0..n).map(Ok)).boxed()
    }

    fn fan_out(
        upstream: EventStream<u32>,
        limit: usize,
        sub_pipeline: SubPipeline<u32>,
        strategy: FailureStrategy,
    ) -> FanOut<u32> {
        let limit = NonZeroUsize::new(limit).expect("test limits are positive");
        FanOut::new(upstream, limit, sub_pipeline, strategy)
    }

    /// Events divisible by 5 fail; event `n` takes `5 * (10 - n % 10)` ms.
    fn delayed(fail_multiples_of_five: bool) -> SubPipeline<u32> {
        Arc::new(move |event: u32| {
            stream::once(async move {
                tokio::time::sleep(Duration::from_millis(5 * u64::from(10 - event % 10))).await;
                if fail_multiples_of_five && event % 5 == 0 {
                    Err(PipelineError::processor_failed("fan-out/test", format!("event {}", event)))
                } else {
                    Ok(event)
                }
            })
            .boxed()
        })
    }

    #[tokio::test]
    async fn emits_every_event_exactly_once() {
        let mut output: Vec<u32> = fan_out(numbers(50), 8, delayed(false), FailureStrategy::ContinueOnError)
            .map(|item| item.unwrap())
            .collect()
            .await;
        output.sort_unstable();
        assert_eq!(output, (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn completion_order_follows_latency_not_arrival() {
        let output: Vec<u32> = fan_out(numbers(10), 10, delayed(false), FailureStrategy::ContinueOnError)
            .map(|item| item.unwrap())
            .collect()
            .await;
        // Event 9 is the fastest, event 0 the slowest.
        assert_eq!(output.first(), Some(&9));
        assert_eq!(output.last(), Some(&0));
    }

    #[tokio::test]
    async fn never_exceeds_the_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let limit = 3;
        let (a, p) = (active.clone(), peak.clone());
        let sub_pipeline: SubPipeline<u32> = Arc::new(move |event| {
            let (active, peak) = (a.clone(), p.clone());
            stream::once(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(event)
            })
            .boxed()
        });

        let count = fan_out(numbers(10 * limit as u32), limit, sub_pipeline, FailureStrategy::ContinueOnError)
            .count()
            .await;

        assert_eq!(count, 30);
        assert!(peak.load(Ordering::SeqCst) <= limit);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn a_single_slot_runs_invocations_one_at_a_time() {
        let mut events = fan_out(numbers(3), 1, delayed(false), FailureStrategy::ContinueOnError);

        assert_eq!(events.next().await, Some(Ok(0)));
        assert!(events.in_flight() <= 1);
        let rest: Vec<u32> = events.map(|item| item.unwrap()).collect().await;
        // Arrival order survives because nothing ever overlaps.
        assert_eq!(rest, vec![1, 2]);
    }

    #[tokio::test]
    async fn continue_on_error_isolates_failures() {
        let output: Vec<_> = fan_out(numbers(20), 4, delayed(true), FailureStrategy::ContinueOnError)
            .collect()
            .await;
        assert_eq!(output.len(), 20);
        assert_eq!(output.iter().filter(|item| item.is_err()).count(), 4);
    }

    /// Event 0 fails at once, everything else succeeds after 20ms.
    fn first_fails_fast() -> SubPipeline<u32> {
        Arc::new(|event: u32| {
            stream::once(async move {
                if event == 0 {
                    return Err(PipelineError::processor_failed("fan-out/test", "event 0"));
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(event)
            })
            .boxed()
        })
    }

    #[tokio::test]
    async fn fail_fast_drops_in_flight_siblings() {
        let output: Vec<_> = fan_out(numbers(20), 4, first_fails_fast(), FailureStrategy::FailFast)
            .collect()
            .await;
        assert_eq!(
            output,
            vec![Err(PipelineError::processor_failed("fan-out/test", "event 0"))]
        );
    }

    #[tokio::test]
    async fn best_effort_drains_in_flight_then_fails() {
        let output: Vec<_> = fan_out(numbers(20), 4, first_fails_fast(), FailureStrategy::BestEffort)
            .collect()
            .await;

        assert_eq!(output.len(), 4);
        let mut drained: Vec<u32> = output[..3].iter().map(|item| *item.as_ref().unwrap()).collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![1, 2, 3]);
        assert_eq!(
            output[3],
            Err(PipelineError::processor_failed("fan-out/test", "event 0"))
        );
    }

    #[tokio::test]
    async fn upstream_failure_ends_the_stream() {
        let upstream = stream::iter(vec![
            Ok(1u32),
            Err(PipelineError::processor_failed("source", "disconnected")),
            Ok(2),
        ])
        .boxed();
        let output: Vec<_> = fan_out(upstream, 4, delayed(false), FailureStrategy::ContinueOnError)
            .collect()
            .await;
        assert_eq!(
            output,
            vec![Err(PipelineError::processor_failed("source", "disconnected"))]
        );
    }
}
