// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for profiling data producers.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A profiling data producer returned an error. The event continues.
///
/// # Log Level
/// `warn!` - Telemetry is degraded, data path is not
pub struct ProfilingProducerFailed<'a> {
    pub event_type: &'a str,
    pub location: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProfilingProducerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profiling data producer for '{}' at '{}' failed: {}",
            self.event_type, self.location, self.error
        )
    }
}

impl StructuredLog for ProfilingProducerFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            event_type = self.event_type,
            location = self.location,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "profiling_producer_failed",
            span_name = name,
            event_type = self.event_type,
            location = self.location,
        )
    }
}

/// A profiling data producer panicked. The panic was contained.
///
/// # Log Level
/// `error!` - A producer is broken
pub struct ProfilingProducerPanicked<'a> {
    pub event_type: &'a str,
    pub location: &'a str,
    pub panic_message: &'a str,
}

impl Display for ProfilingProducerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profiling data producer for '{}' at '{}' panicked: {}",
            self.event_type, self.location, self.panic_message
        )
    }
}

impl StructuredLog for ProfilingProducerPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            event_type = self.event_type,
            location = self.location,
            panic_message = self.panic_message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "profiling_producer_panicked",
            span_name = name,
            event_type = self.event_type,
            location = self.location,
        )
    }
}

/// A profiling boundary was crossed.
///
/// # Log Level
/// `debug!` - Emitted by `TracingProfilingService` once per event per boundary
pub struct BoundaryObserved<'a> {
    pub event_type: &'a str,
    pub location: &'a str,
    pub artifact_id: &'a str,
    pub artifact_type: &'a str,
    pub thread_name: &'a str,
}

impl Display for BoundaryObserved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} at '{}' ({} '{}')",
            self.thread_name, self.event_type, self.location, self.artifact_type, self.artifact_id
        )
    }
}

impl StructuredLog for BoundaryObserved<'_> {
    fn log(&self) {
        tracing::debug!(
            event_type = self.event_type,
            location = self.location,
            artifact_id = self.artifact_id,
            artifact_type = self.artifact_type,
            thread = self.thread_name,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "profiling_boundary",
            span_name = name,
            event_type = self.event_type,
            location = self.location,
        )
    }
}
