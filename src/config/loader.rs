// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_ARTIFACT_TYPE, DEFAULT_PARALLELISM, DEFAULT_WORKER_THREADS};
use crate::errors::{ConfigError, FailureStrategy};
use crate::observability::messages::config::ConfigLoaded;
use crate::observability::profiling::ProfilingEventKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration of one processing strategy and the worker pools it uses.
///
/// # Fields
/// * `artifact_id` / `artifact_type` - Reported with every profiling observation
/// * `parallelism` - Events processed concurrently (optional, defaults to 1)
/// * `failure_strategy` - Sibling failure handling when parallel (optional, defaults to ContinueOnError)
/// * `context_scheduler` - Scheduler published to the processor through the pipeline context
/// * `dispatch_scheduler` - Scheduler the processor runs on (optional)
/// * `callback_scheduler` - Scheduler results are delivered on (optional)
/// * `profiling` - Which boundaries are profiled (optional, defaults to none)
/// * `schedulers` - Worker pools to start
///
/// # Example
/// ```yaml
/// artifact_id: orders-app
/// artifact_type: app
/// parallelism: 4
/// failure_strategy: continue_on_error
/// context_scheduler: cpu_light
/// dispatch_scheduler: io
/// profiling:
///   enabled: true
///   kinds: [pre_dispatch, post_callback]
/// schedulers:
///   - name: io
///     worker_threads: 4
///     capacity: 64
///   - name: cpu_light
///     worker_threads: 2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub artifact_id: String,
    #[serde(default = "default_artifact_type")]
    pub artifact_type: String,
    #[serde(default = "default_parallelism")]
    pub parallelism: i64,
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    pub context_scheduler: String,
    pub dispatch_scheduler: Option<String>,
    pub callback_scheduler: Option<String>,
    #[serde(default)]
    pub profiling: ProfilingConfig,
    pub schedulers: Vec<SchedulerConfig>,
}

fn default_artifact_type() -> String {
    DEFAULT_ARTIFACT_TYPE.to_string()
}

fn default_parallelism() -> i64 {
    DEFAULT_PARALLELISM
}

fn default_worker_threads() -> usize {
    DEFAULT_WORKER_THREADS
}

/// Profiling switches. Without `kinds`, every boundary is profiled once
/// enabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilingConfig {
    #[serde(default)]
    pub enabled: bool,
    pub kinds: Option<Vec<ProfilingEventKind>>,
}

impl ProfilingConfig {
    /// Boundaries to profile; empty when profiling is disabled.
    pub fn enabled_kinds(&self) -> Vec<ProfilingEventKind> {
        if !self.enabled {
            return Vec::new();
        }
        match &self.kinds {
            Some(kinds) => kinds.clone(),
            None => ProfilingEventKind::ALL.to_vec(),
        }
    }
}

/// A named worker pool.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub name: String,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Maximum outstanding submissions before the pool rejects work
    pub capacity: Option<usize>,
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StrategyConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg: StrategyConfig = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        _ => return Err(ConfigError::UnsupportedFormat { extension }),
    };

    tracing::info!(
        "{}",
        ConfigLoaded {
            path: &path.display().to_string(),
            artifact_id: &cfg.artifact_id,
            scheduler_count: cfg.schedulers.len(),
        }
    );
    Ok(cfg)
}

/// Load and validate a config file
///
/// Every problem found is reported at once in `ConfigError::Invalid`.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<StrategyConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
