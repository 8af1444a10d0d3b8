// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use thiserror::Error;

/// Errors carried on a pipeline's failure channel.
///
/// Every variant is attributable to exactly one event path: a scheduler
/// that refused a handoff, a processor that failed, or a handoff torn down
/// before it finished.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Scheduler '{scheduler}' rejected handoff: {source}")]
    SchedulerRejected {
        scheduler: String,
        #[source]
        source: SchedulerError,
    },

    #[error("Processor '{location}' failed: {message}")]
    ProcessorFailed { location: String, message: String },

    #[error("Handoff to scheduler '{scheduler}' was cancelled before completion")]
    Cancelled { scheduler: String },
}

impl PipelineError {
    pub fn processor_failed(location: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::ProcessorFailed {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Reasons a scheduler refuses to accept work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("scheduler is saturated ({capacity} tasks outstanding)")]
    Saturated { capacity: usize },

    #[error("scheduler is shut down")]
    ShutDown,
}

/// A profiling data producer failed. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Profiling data producer failed: {message}")]
pub struct ProfilingError {
    pub message: String,
}

impl ProfilingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// How a fan-out reacts when one of its per-event invocations fails.
///
/// * `ContinueOnError` - the failure is emitted for that event only and the
///   stream keeps going.
/// * `FailFast` - in-flight siblings are cancelled and the stream terminates
///   with the failure.
/// * `BestEffort` - no further events are admitted, in-flight siblings drain
///   and their results are emitted, then the stream terminates with the
///   first failure.
///
/// The sequential path (parallelism 1) always terminates on the first
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    FailFast,
    #[default]
    ContinueOnError,
    BestEffort,
}
