// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete schedulers and processors.
//!
//! # Available Backends
//!
//! ## Scheduler Backend
//! Tokio worker pools that pipelines hand work to:
//! - **WorkerPool**: owns a multi-threaded runtime with named threads
//! - **RuntimeScheduler**: the non-owning handle pipelines receive, with an
//!   optional capacity after which submissions are rejected
//!
//! ## Local Backend
//! In-process processors for text events:
//! - **ChangeTextCaseProcessor**: upper, lower, proper and title case
//!
//! ## Stub Backend (Test-Only)
//! Testing utilities (only available in test builds):
//! - **InlineScheduler**: runs tasks on the current runtime
//! - **RejectingScheduler** / **DiscardingScheduler**: refuse or lose work
//! - **StubProcessor** / **FailingProcessor**: pass through or fail events

pub mod local;
pub mod scheduler;
#[cfg(test)]
pub mod stub;
