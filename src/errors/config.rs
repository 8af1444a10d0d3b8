// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while configuring a pipeline, either through the builder
//! or from a configuration file.

use thiserror::Error;

/// Errors that prevent a pipeline or its runtime from being constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Parallelism must be at least 1. Never clamped.
    #[error("Invalid parallelism {value}: must be >= 1")]
    InvalidParallelism { value: i64 },

    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config file extension '{extension}' (expected yaml, yml or toml)")]
    UnsupportedFormat { extension: String },

    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Failed to start worker pool '{name}': {source}")]
    WorkerPoolStart {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors found while validating a loaded configuration file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Two schedulers share the same name
    #[error("Duplicate scheduler name: '{name}'")]
    DuplicateSchedulerName { name: String },

    /// A pipeline field names a scheduler that is not defined
    #[error("Field '{field}' references scheduler '{name}' which does not exist")]
    UnknownScheduler { field: &'static str, name: String },

    #[error("Parallelism must be >= 1, got {value}")]
    InvalidParallelism { value: i64 },

    #[error("Scheduler '{name}' must have at least one worker thread")]
    NoWorkerThreads { name: String },

    #[error("Scheduler '{name}' capacity must be >= 1 when set")]
    ZeroCapacity { name: String },
}
