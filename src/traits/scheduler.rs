// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::errors::SchedulerError;

/// A unit of work submitted to a scheduler.
pub type Task = BoxFuture<'static, ()>;

/// Shared, non-owning handle to an externally owned scheduler.
pub type SchedulerHandle = Arc<dyn Scheduler>;

/// An execution context capable of running submitted work.
///
/// Implementations are owned elsewhere (see `backends::scheduler::WorkerPool`);
/// the pipeline only ever holds `SchedulerHandle`s and never shuts a
/// scheduler down or resizes it.
pub trait Scheduler: Send + Sync {
    fn name(&self) -> &str;

    /// Submit a task without waiting for it to start.
    ///
    /// Returns an error when the scheduler cannot accept the task
    /// (saturated or shut down). On error the task has been dropped
    /// without being polled.
    fn submit(&self, task: Task) -> Result<(), SchedulerError>;
}

impl std::fmt::Debug for dyn Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("name", &self.name()).finish()
    }
}
