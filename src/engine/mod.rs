// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline engine: context propagation, profiling stages, scheduler
//! handoffs, bounded fan-out and the builder that puts them together.

pub mod assembler;
pub mod builder;
pub mod context;
pub mod fan_out;
pub mod handoff;
pub mod profiling;

pub use assembler::ProcessingStrategyPipeline;
pub use builder::ProcessingStrategyBuilder;
pub use context::{ContextValue, PipelineContext, PROCESSOR_SCHEDULER_CONTEXT_KEY};
pub use fan_out::{FanOut, SubPipeline};
pub use handoff::{handoff, Continuation};
