// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles for schedulers and processors.

use futures::stream::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::context::PipelineContext;
use crate::errors::{PipelineError, SchedulerError};
use crate::traits::{ComponentLocation, EventStream, Processor, Scheduler, Task};

/// Runs tasks on whatever tokio runtime is current.
pub struct InlineScheduler {
    name: String,
}

impl InlineScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Scheduler for InlineScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, task: Task) -> Result<(), SchedulerError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::ShutDown)?;
        handle.spawn(task);
        Ok(())
    }
}

/// Refuses every submission with a fixed error.
pub struct RejectingScheduler {
    name: String,
    error: SchedulerError,
}

impl RejectingScheduler {
    pub fn new(name: impl Into<String>, error: SchedulerError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl Scheduler for RejectingScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, _task: Task) -> Result<(), SchedulerError> {
        Err(self.error)
    }
}

/// Accepts every submission and drops the task without running it, like a
/// pool that is torn down right after accepting work.
pub struct DiscardingScheduler {
    name: String,
}

impl DiscardingScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Scheduler for DiscardingScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, task: Task) -> Result<(), SchedulerError> {
        drop(task);
        Ok(())
    }
}

/// Runs tasks on the current tokio runtime, except the `reject_at`-th
/// submission (counting from 1), which fails with `SchedulerError::ShutDown`.
pub struct RejectNthScheduler {
    name: String,
    reject_at: usize,
    submissions: AtomicUsize,
}

impl RejectNthScheduler {
    pub fn new(name: impl Into<String>, reject_at: usize) -> Self {
        Self {
            name: name.into(),
            reject_at,
            submissions: AtomicUsize::new(0),
        }
    }
}

impl Scheduler for RejectNthScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, task: Task) -> Result<(), SchedulerError> {
        if self.submissions.fetch_add(1, Ordering::SeqCst) + 1 == self.reject_at {
            return Err(SchedulerError::ShutDown);
        }
        let handle = tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::ShutDown)?;
        handle.spawn(task);
        Ok(())
    }
}

/// Passes events through unchanged.
pub struct StubProcessor {
    location: ComponentLocation,
}

impl StubProcessor {
    pub fn new(location: &str) -> Self {
        Self {
            location: ComponentLocation::new(location),
        }
    }
}

impl<E: Send + 'static> Processor<E> for StubProcessor {
    fn apply(&self, events: EventStream<E>, _context: &PipelineContext) -> EventStream<E> {
        events
    }

    fn location(&self) -> &ComponentLocation {
        &self.location
    }
}

/// Fails every event.
pub struct FailingProcessor {
    location: ComponentLocation,
}

impl FailingProcessor {
    pub fn new(location: &str) -> Self {
        Self {
            location: ComponentLocation::new(location),
        }
    }
}

impl<E: Send + 'static> Processor<E> for FailingProcessor {
    fn apply(&self, events: EventStream<E>, _context: &PipelineContext) -> EventStream<E> {
        let location = self.location.to_string();
        events
            .map(move |item| {
                item.and_then(|_| {
                    Err(PipelineError::processor_failed(
                        location.clone(),
                        "Simulated processor failure",
                    ))
                })
            })
            .boxed()
    }

    fn location(&self) -> &ComponentLocation {
        &self.location
    }
}
