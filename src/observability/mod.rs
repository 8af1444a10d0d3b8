// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability: structured log messages and pipeline profiling.
//!
//! * `messages` - one struct per diagnostic event, rendered through `Display`
//!   and emitted with structured fields through `StructuredLog`
//! * `profiling` - profiling boundaries, the context handed to data
//!   producers, and the two bundled profiling services
//!
//! # Usage
//!
//! ```rust
//! use strategy_pipeline::observability::messages::StructuredLog;
//! use strategy_pipeline::observability::messages::scheduler::HandoffSubmitted;
//!
//! let msg = HandoffSubmitted { scheduler: "io" };
//! msg.log();
//! ```

pub mod messages;
pub mod profiling;
