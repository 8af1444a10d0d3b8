// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod processor;
pub mod profiling;
pub mod scheduler;

pub use processor::{ComponentLocation, EventProcessor, EventStream, FlatMapProcessor, FnProcessor, PerEventProcessor, Processor};
pub use profiling::{ProfilingDataProducer, ProfilingService};
pub use scheduler::{Scheduler, SchedulerHandle, Task};
