// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scheduler handoff.
//!
//! `handoff` moves the downstream part of a stream onto a scheduler. The
//! upstream keeps being pulled by whoever polls the returned stream; items
//! cross to the scheduler through a bounded channel, so a slow scheduler
//! slows the upstream down instead of buffering without limit.
//!
//! ```text
//!   caller's context             target scheduler
//!   ----------------             ----------------
//!   upstream --> [inbound] --> downstream(..) --> [outbound] --> consumer
//! ```
//!
//! The downstream task is submitted on first poll. If the scheduler refuses
//! it, the stream yields one `PipelineError::SchedulerRejected` and ends;
//! nothing downstream has run. Dropping the stream cancels the task.

use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard, PollSender};
use tracing::Instrument;

use crate::config::consts::HANDOFF_BUFFER_SIZE;
use crate::errors::PipelineError;
use crate::observability::messages::scheduler::{HandoffCancelled, HandoffSubmitted, SchedulerRejected};
use crate::observability::messages::StructuredLog;
use crate::traits::{EventStream, SchedulerHandle};

/// The part of a pipeline that runs after a handoff.
pub type Continuation<E> = Box<dyn FnOnce(EventStream<E>) -> EventStream<E> + Send>;

type Item<E> = Result<E, PipelineError>;

/// Apply `downstream` to `upstream`, on `target` when one is given.
///
/// Without a target this is exactly `downstream(upstream)`.
pub fn handoff<E>(
    upstream: EventStream<E>,
    target: Option<SchedulerHandle>,
    downstream: Continuation<E>,
) -> EventStream<E>
where
    E: Send + 'static,
{
    match target {
        None => downstream(upstream),
        Some(scheduler) => Handoff {
            state: State::Idle {
                upstream,
                scheduler,
                downstream,
            },
        }
        .boxed(),
    }
}

struct Handoff<E> {
    state: State<E>,
}

// Fields are never pinned in place, items are only moved in and out.
impl<E> Unpin for Handoff<E> {}

enum State<E> {
    Idle {
        upstream: EventStream<E>,
        scheduler: SchedulerHandle,
        downstream: Continuation<E>,
    },
    Running(Running<E>),
    Done,
}

struct Running<E> {
    scheduler: String,
    upstream: Option<EventStream<E>>,
    pending: Option<Item<E>>,
    inbound: PollSender<Item<E>>,
    outbound: mpsc::Receiver<Item<E>>,
    completed: oneshot::Receiver<()>,
    _cancel_on_drop: DropGuard,
}

impl<E: Send + 'static> Running<E> {
    /// Move upstream items into the inbound channel while it has room.
    fn feed(&mut self, cx: &mut Context<'_>) {
        loop {
            if self.pending.is_none() {
                let Some(upstream) = self.upstream.as_mut() else {
                    return;
                };
                match upstream.poll_next_unpin(cx) {
                    Poll::Ready(Some(item)) => self.pending = Some(item),
                    Poll::Ready(None) => {
                        self.upstream = None;
                        self.inbound.close();
                        return;
                    }
                    Poll::Pending => return,
                }
            }

            match self.inbound.poll_reserve(cx) {
                Poll::Ready(Ok(())) => {
                    if let Some(item) = self.pending.take() {
                        if self.inbound.send_item(item).is_err() {
                            self.stop_feeding();
                            return;
                        }
                    }
                }
                // The downstream task is gone; its outcome arrives on `outbound`.
                Poll::Ready(Err(_)) => {
                    self.stop_feeding();
                    return;
                }
                Poll::Pending => return,
            }
        }
    }

    fn stop_feeding(&mut self) {
        self.upstream = None;
        self.pending = None;
    }
}

impl<E: Send + 'static> Stream for Handoff<E> {
    type Item = Item<E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                State::Idle { .. } => {
                    let State::Idle {
                        upstream,
                        scheduler,
                        downstream,
                    } = std::mem::replace(&mut this.state, State::Done)
                    else {
                        unreachable!("state checked above");
                    };
                    match start(upstream, &scheduler, downstream) {
                        Ok(running) => this.state = State::Running(running),
                        Err(error) => return Poll::Ready(Some(Err(error))),
                    }
                }
                State::Running(running) => {
                    running.feed(cx);
                    match running.outbound.poll_recv(cx) {
                        Poll::Ready(Some(item)) => return Poll::Ready(Some(item)),
                        Poll::Ready(None) => {
                            // The task drops its output sender only after
                            // signalling completion, unless it never ran to the end.
                            let finished = running.completed.try_recv().is_ok();
                            let scheduler = std::mem::take(&mut running.scheduler);
                            this.state = State::Done;
                            if !finished {
                                return Poll::Ready(Some(Err(PipelineError::Cancelled { scheduler })));
                            }
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                }
                State::Done => return Poll::Ready(None),
            }
        }
    }
}

fn start<E: Send + 'static>(
    upstream: EventStream<E>,
    scheduler: &SchedulerHandle,
    downstream: Continuation<E>,
) -> Result<Running<E>, PipelineError> {
    let (inbound_tx, inbound_rx) = mpsc::channel(HANDOFF_BUFFER_SIZE);
    let (outbound_tx, outbound_rx) = mpsc::channel(HANDOFF_BUFFER_SIZE);
    let (completed_tx, completed_rx) = oneshot::channel();
    let cancel = CancellationToken::new();

    let task = run_downstream(
        scheduler.name().to_string(),
        ReceiverStream::new(inbound_rx).boxed(),
        downstream,
        outbound_tx,
        completed_tx,
        cancel.clone(),
    );

    let submitted = HandoffSubmitted {
        scheduler: scheduler.name(),
    };
    let span = submitted.span("handoff");

    if let Err(source) = scheduler.submit(Box::pin(task.instrument(span))) {
        SchedulerRejected {
            scheduler: scheduler.name(),
            error: &source,
        }
        .log();
        return Err(PipelineError::SchedulerRejected {
            scheduler: scheduler.name().to_string(),
            source,
        });
    }
    submitted.log();

    Ok(Running {
        scheduler: scheduler.name().to_string(),
        upstream: Some(upstream),
        pending: None,
        inbound: PollSender::new(inbound_tx),
        outbound: outbound_rx,
        completed: completed_rx,
        _cancel_on_drop: cancel.drop_guard(),
    })
}

async fn run_downstream<E: Send + 'static>(
    scheduler: String,
    inbound: EventStream<E>,
    downstream: Continuation<E>,
    outbound: mpsc::Sender<Item<E>>,
    completed: oneshot::Sender<()>,
    cancel: CancellationToken,
) {
    let mut output = downstream(inbound);
    let mut delivered = 0usize;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                HandoffCancelled { scheduler: &scheduler, delivered }.log();
                return;
            }
            next = output.next() => next,
        };
        let Some(item) = next else {
            break;
        };
        // Once taken from the stream an item is always handed over, never
        // abandoned halfway because of cancellation.
        if outbound.send(item).await.is_err() {
            return;
        }
        delivered += 1;
    }
    let _ = completed.send(());
}
