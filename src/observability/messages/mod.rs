// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human readable line.
//! Messages emitted on hot or operationally relevant paths also implement
//! `StructuredLog`, which logs at the message's level with the message's
//! fields attached.
//!
//! * `config` - configuration loading
//! * `pipeline` - pipeline assembly and fan-out events
//! * `profiling` - profiling data producer failures and observations
//! * `scheduler` - handoffs and worker pool lifecycle

use tracing::Span;

pub mod config;
pub mod pipeline;
pub mod profiling;
pub mod scheduler;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
