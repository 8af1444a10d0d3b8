// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::scheduler::WorkerPool;
use crate::config::{validate_config, StrategyConfig};
use crate::engine::ProcessingStrategyBuilder;
use crate::errors::{ConfigError, ValidationError};
use crate::observability::profiling::TracingProfilingService;
use crate::traits::{Processor, ProfilingService, SchedulerHandle};

/// The worker pools started for a configuration.
///
/// Pipelines only hold handles; the pools stop when this value is dropped or
/// `shutdown` is called, after which their handles reject new work.
pub struct WorkerPools {
    pools: HashMap<String, WorkerPool>,
}

impl WorkerPools {
    pub fn handle(&self, name: &str) -> Option<SchedulerHandle> {
        self.pools.get(name).map(WorkerPool::handle)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn shutdown(&mut self) {
        for pool in self.pools.values_mut() {
            pool.shutdown();
        }
    }
}

/// Pipeline runtime builder - starts worker pools and prepares a pipeline
/// builder from configuration.
///
/// # Examples
///
/// ## Building a runtime from configuration
/// ```
/// use strategy_pipeline::backends::local::ChangeTextCaseProcessor;
/// use strategy_pipeline::config::{RuntimeBuilder, SchedulerConfig, StrategyConfig};
/// use strategy_pipeline::traits::PerEventProcessor;
///
/// let config = StrategyConfig {
///     artifact_id: "orders-app".to_string(),
///     artifact_type: "app".to_string(),
///     parallelism: 2,
///     failure_strategy: Default::default(),
///     context_scheduler: "main".to_string(),
///     dispatch_scheduler: Some("main".to_string()),
///     callback_scheduler: None,
///     profiling: Default::default(),
///     schedulers: vec![SchedulerConfig {
///         name: "main".to_string(),
///         worker_threads: 1,
///         capacity: None,
///     }],
/// };
///
/// let processor = PerEventProcessor::new(ChangeTextCaseProcessor::upper("orders/processors/0"));
/// let (pools, builder) = RuntimeBuilder::from_config::<String, _>(&config, processor).unwrap();
/// let pipeline = builder.build().unwrap();
///
/// assert_eq!(pools.len(), 1);
/// assert_eq!(pipeline.parallelism(), 2);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the worker pools and a configured pipeline builder.
    ///
    /// Profiling, when enabled, is reported through `TracingProfilingService`.
    pub fn from_config<E, P>(
        cfg: &StrategyConfig,
        processor: P,
    ) -> Result<(WorkerPools, ProcessingStrategyBuilder<E>), ConfigError>
    where
        E: Send + 'static,
        P: Processor<E> + 'static,
    {
        let kinds = cfg.profiling.enabled_kinds();
        let service = if kinds.is_empty() {
            None
        } else {
            Some(Arc::new(TracingProfilingService::for_kinds(&kinds)) as Arc<dyn ProfilingService>)
        };
        Self::from_config_with_profiling(cfg, processor, service)
    }

    /// Like `from_config`, reporting profiling to `profiling_service`
    /// instead. The configured profiling switches are not consulted.
    pub fn from_config_with_profiling<E, P>(
        cfg: &StrategyConfig,
        processor: P,
        profiling_service: Option<Arc<dyn ProfilingService>>,
    ) -> Result<(WorkerPools, ProcessingStrategyBuilder<E>), ConfigError>
    where
        E: Send + 'static,
        P: Processor<E> + 'static,
    {
        validate_config(cfg).map_err(ConfigError::Invalid)?;

        let mut pools = HashMap::new();
        for scheduler in &cfg.schedulers {
            let pool = WorkerPool::new(scheduler.name.clone(), scheduler.worker_threads, scheduler.capacity)?;
            pools.insert(scheduler.name.clone(), pool);
        }
        let pools = WorkerPools { pools };

        let lookup = |field: &'static str, name: &str| {
            pools.handle(name).ok_or_else(|| {
                ConfigError::Invalid(vec![ValidationError::UnknownScheduler {
                    field,
                    name: name.to_string(),
                }])
            })
        };
        let context_scheduler = lookup("context_scheduler", &cfg.context_scheduler)?;
        let dispatch_scheduler = cfg
            .dispatch_scheduler
            .as_deref()
            .map(|name| lookup("dispatch_scheduler", name))
            .transpose()?;
        let callback_scheduler = cfg
            .callback_scheduler
            .as_deref()
            .map(|name| lookup("callback_scheduler", name))
            .transpose()?;

        let builder = ProcessingStrategyBuilder::new(
            processor,
            context_scheduler,
            cfg.artifact_id.clone(),
            cfg.artifact_type.clone(),
        )
        .with_parallelism(cfg.parallelism)
        .with_failure_strategy(cfg.failure_strategy)
        .with_dispatch_scheduler(dispatch_scheduler)
        .with_callback_scheduler(callback_scheduler)
        .with_profiling_service(profiling_service);

        Ok((pools, builder))
    }
}
