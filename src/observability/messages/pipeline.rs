// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline assembly and fan-out events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A processing strategy pipeline was built.
///
/// # Log Level
/// `debug!` - Construction detail
///
/// # Example
/// ```
/// use strategy_pipeline::observability::messages::pipeline::PipelineAssembled;
///
/// let msg = PipelineAssembled {
///     location: "orders/processors/0",
///     artifact_id: "orders-app",
///     parallelism: 4,
///     dispatch_scheduler: Some("io"),
///     callback_scheduler: None,
///     profiled_boundaries: 2,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Assembled pipeline for 'orders/processors/0' (artifact 'orders-app'): parallelism=4, dispatch=io, callback=<current>, profiled_boundaries=2"
/// );
/// ```
pub struct PipelineAssembled<'a> {
    pub location: &'a str,
    pub artifact_id: &'a str,
    pub parallelism: usize,
    pub dispatch_scheduler: Option<&'a str>,
    pub callback_scheduler: Option<&'a str>,
    pub profiled_boundaries: usize,
}

impl Display for PipelineAssembled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Assembled pipeline for '{}' (artifact '{}'): parallelism={}, dispatch={}, callback={}, profiled_boundaries={}",
            self.location,
            self.artifact_id,
            self.parallelism,
            self.dispatch_scheduler.unwrap_or("<current>"),
            self.callback_scheduler.unwrap_or("<current>"),
            self.profiled_boundaries
        )
    }
}

impl StructuredLog for PipelineAssembled<'_> {
    fn log(&self) {
        tracing::debug!(
            location = self.location,
            artifact_id = self.artifact_id,
            parallelism = self.parallelism,
            dispatch_scheduler = ?self.dispatch_scheduler,
            callback_scheduler = ?self.callback_scheduler,
            profiled_boundaries = self.profiled_boundaries,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline",
            span_name = name,
            location = self.location,
            artifact_id = self.artifact_id,
            parallelism = self.parallelism,
        )
    }
}

/// A single fan-out invocation failed.
///
/// # Log Level
/// `warn!` - The failure is attributed to one event
pub struct FanOutInvocationFailed<'a> {
    pub strategy: &'a str,
    pub in_flight: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for FanOutInvocationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fan-out invocation failed ({} strategy, {} still in flight): {}",
            self.strategy, self.in_flight, self.error
        )
    }
}

impl StructuredLog for FanOutInvocationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            strategy = self.strategy,
            in_flight = self.in_flight,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "fan_out_invocation_failed",
            span_name = name,
            strategy = self.strategy,
            in_flight = self.in_flight,
        )
    }
}

/// A fan-out stopped admitting events.
///
/// # Log Level
/// `debug!` - Follows a failure that was already logged
pub struct FanOutHalted<'a> {
    pub reason: &'a str,
    pub cancelled: usize,
    pub draining: usize,
}

impl Display for FanOutHalted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fan-out halted ({}): {} invocations cancelled, {} draining",
            self.reason, self.cancelled, self.draining
        )
    }
}

impl StructuredLog for FanOutHalted<'_> {
    fn log(&self) {
        tracing::debug!(
            reason = self.reason,
            cancelled = self.cancelled,
            draining = self.draining,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "fan_out_halted",
            span_name = name,
            reason = self.reason,
        )
    }
}
