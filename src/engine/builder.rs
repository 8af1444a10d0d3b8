// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fluent construction of processing strategy pipelines.
//!
//! ```
//! use std::sync::Arc;
//! use strategy_pipeline::backends::scheduler::RuntimeScheduler;
//! use strategy_pipeline::engine::{PipelineContext, ProcessingStrategyBuilder};
//! use strategy_pipeline::errors::{ConfigError, PipelineError};
//! use strategy_pipeline::traits::{FnProcessor, SchedulerHandle};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let context: SchedulerHandle = Arc::new(RuntimeScheduler::from_handle(
//!     "cpu-light",
//!     runtime.handle().clone(),
//!     None,
//! ));
//! let doubler = FnProcessor::new("demo/processors/0", |n: u32, _ctx: PipelineContext| async move {
//!     Ok::<_, PipelineError>(n * 2)
//! });
//!
//! let builder = ProcessingStrategyBuilder::<u32>::new(doubler, context, "demo-app", "app");
//! let invalid = builder.with_parallelism(0).build();
//! assert!(matches!(invalid, Err(ConfigError::InvalidParallelism { value: 0 })));
//! ```

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::consts::DEFAULT_PARALLELISM;
use crate::engine::assembler::{Assembly, ProcessingStrategyPipeline};
use crate::engine::profiling::{BoundaryProducers, ProfilingSite};
use crate::errors::{ConfigError, FailureStrategy};
use crate::observability::messages::pipeline::PipelineAssembled;
use crate::observability::messages::StructuredLog;
use crate::traits::{Processor, ProfilingService, SchedulerHandle};

/// Collects the configuration of one pipeline.
///
/// Nothing is validated or started until `build()`.
pub struct ProcessingStrategyBuilder<E> {
    processor: Arc<dyn Processor<E>>,
    context_scheduler: SchedulerHandle,
    artifact_id: String,
    artifact_type: String,
    parallelism: i64,
    dispatch_scheduler: Option<SchedulerHandle>,
    callback_scheduler: Option<SchedulerHandle>,
    profiling_service: Option<Arc<dyn ProfilingService>>,
    failure_strategy: FailureStrategy,
}

impl<E: Send + 'static> ProcessingStrategyBuilder<E> {
    pub fn new<P>(
        processor: P,
        context_scheduler: SchedulerHandle,
        artifact_id: impl Into<String>,
        artifact_type: impl Into<String>,
    ) -> Self
    where
        P: Processor<E> + 'static,
    {
        Self::from_shared(Arc::new(processor), context_scheduler, artifact_id, artifact_type)
    }

    /// Like `new`, for a processor that is already shared.
    pub fn from_shared(
        processor: Arc<dyn Processor<E>>,
        context_scheduler: SchedulerHandle,
        artifact_id: impl Into<String>,
        artifact_type: impl Into<String>,
    ) -> Self {
        Self {
            processor,
            context_scheduler,
            artifact_id: artifact_id.into(),
            artifact_type: artifact_type.into(),
            parallelism: DEFAULT_PARALLELISM,
            dispatch_scheduler: None,
            callback_scheduler: None,
            profiling_service: None,
            failure_strategy: FailureStrategy::default(),
        }
    }

    /// Maximum number of events processed concurrently. `1` keeps the stream
    /// sequential; anything below `1` makes `build()` fail.
    pub fn with_parallelism(mut self, parallelism: i64) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_dispatch_scheduler(mut self, scheduler: Option<SchedulerHandle>) -> Self {
        self.dispatch_scheduler = scheduler;
        self
    }

    pub fn with_callback_scheduler(mut self, scheduler: Option<SchedulerHandle>) -> Self {
        self.callback_scheduler = scheduler;
        self
    }

    pub fn with_profiling_service(mut self, service: Option<Arc<dyn ProfilingService>>) -> Self {
        self.profiling_service = service;
        self
    }

    /// How a failed event affects its siblings when parallelism is above 1.
    pub fn with_failure_strategy(mut self, strategy: FailureStrategy) -> Self {
        self.failure_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<ProcessingStrategyPipeline<E>, ConfigError> {
        let parallelism = usize::try_from(self.parallelism)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::InvalidParallelism {
                value: self.parallelism,
            })?;

        let producers = BoundaryProducers::resolve(self.profiling_service.as_deref());
        let site = Arc::new(ProfilingSite {
            location: self.processor.location().clone(),
            artifact_id: self.artifact_id,
            artifact_type: self.artifact_type,
        });

        PipelineAssembled {
            location: site.location.as_str(),
            artifact_id: &site.artifact_id,
            parallelism: parallelism.get(),
            dispatch_scheduler: self.dispatch_scheduler.as_ref().map(|s| s.name()),
            callback_scheduler: self.callback_scheduler.as_ref().map(|s| s.name()),
            profiled_boundaries: producers.configured(),
        }
        .log();

        Ok(ProcessingStrategyPipeline::from_assembly(Assembly {
            processor: self.processor,
            context_scheduler: self.context_scheduler,
            dispatch_scheduler: self.dispatch_scheduler,
            callback_scheduler: self.callback_scheduler,
            producers,
            site,
            parallelism,
            failure_strategy: self.failure_strategy,
        }))
    }
}
