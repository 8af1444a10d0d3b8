//! Configuration validation.
//!
//! Checks run independently and every error is collected, so one pass over a
//! broken file reports all of its problems:
//!
//! 1. **Parallelism**: at least 1
//! 2. **Scheduler settings**: unique names, at least one worker thread, non-zero capacity
//! 3. **Scheduler references**: every scheduler the strategy names is defined
//!
//! # Examples
//!
//! ```rust
//! use strategy_pipeline::config::{validate_config, SchedulerConfig, StrategyConfig};
//! use strategy_pipeline::errors::ValidationError;
//!
//! let config = StrategyConfig {
//!     artifact_id: "orders-app".to_string(),
//!     artifact_type: "app".to_string(),
//!     parallelism: 4,
//!     failure_strategy: Default::default(),
//!     context_scheduler: "main".to_string(),
//!     dispatch_scheduler: Some("io".to_string()),
//!     callback_scheduler: None,
//!     profiling: Default::default(),
//!     schedulers: vec![SchedulerConfig {
//!         name: "main".to_string(),
//!         worker_threads: 2,
//!         capacity: None,
//!     }],
//! };
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::UnknownScheduler {
//!         field: "dispatch_scheduler",
//!         name: "io".to_string(),
//!     }]
//! );
//! ```

use crate::config::StrategyConfig;
use crate::errors::ValidationError;
use std::collections::HashSet;

/// Validate a loaded configuration.
///
/// # Returns
/// * `Ok(())` if the configuration can be turned into a runtime
/// * `Err(Vec<ValidationError>)` with every problem found
pub fn validate_config(config: &StrategyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.parallelism < 1 {
        errors.push(ValidationError::InvalidParallelism {
            value: config.parallelism,
        });
    }
    errors.extend(validate_scheduler_settings(config));
    errors.extend(validate_scheduler_references(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_scheduler_settings(config: &StrategyConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for scheduler in &config.schedulers {
        if !seen.insert(scheduler.name.as_str()) {
            errors.push(ValidationError::DuplicateSchedulerName {
                name: scheduler.name.clone(),
            });
        }
        if scheduler.worker_threads == 0 {
            errors.push(ValidationError::NoWorkerThreads {
                name: scheduler.name.clone(),
            });
        }
        if scheduler.capacity == Some(0) {
            errors.push(ValidationError::ZeroCapacity {
                name: scheduler.name.clone(),
            });
        }
    }

    errors
}

fn validate_scheduler_references(config: &StrategyConfig) -> Vec<ValidationError> {
    let defined: HashSet<&str> = config.schedulers.iter().map(|s| s.name.as_str()).collect();

    let references = [
        ("context_scheduler", Some(config.context_scheduler.as_str())),
        ("dispatch_scheduler", config.dispatch_scheduler.as_deref()),
        ("callback_scheduler", config.callback_scheduler.as_deref()),
    ];

    references
        .into_iter()
        .filter_map(|(field, name)| name.map(|name| (field, name)))
        .filter(|(_, name)| !defined.contains(name))
        .map(|(field, name)| ValidationError::UnknownScheduler {
            field,
            name: name.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;

    fn scheduler(name: &str, worker_threads: usize, capacity: Option<usize>) -> SchedulerConfig {
        SchedulerConfig {
            name: name.to_string(),
            worker_threads,
            capacity,
        }
    }

    fn config(schedulers: Vec<SchedulerConfig>) -> StrategyConfig {
        StrategyConfig {
            artifact_id: "orders-app".to_string(),
            artifact_type: "app".to_string(),
            parallelism: 1,
            failure_strategy: Default::default(),
            context_scheduler: "main".to_string(),
            dispatch_scheduler: None,
            callback_scheduler: None,
            profiling: Default::default(),
            schedulers,
        }
    }

    #[test]
    fn test_valid_single_scheduler() {
        assert!(validate_config(&config(vec![scheduler("main", 1, None)])).is_ok());
    }

    #[test]
    fn test_duplicate_scheduler_names() {
        let cfg = config(vec![scheduler("main", 1, None), scheduler("main", 2, None)]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateSchedulerName {
                name: "main".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_callback_scheduler() {
        let mut cfg = config(vec![scheduler("main", 1, None)]);
        cfg.callback_scheduler = Some("replies".to_string());

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownScheduler {
                field: "callback_scheduler",
                name: "replies".to_string(),
            }]
        );
    }

    #[test]
    fn test_zero_capacity_and_threads() {
        let cfg = config(vec![scheduler("main", 0, Some(0))]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NoWorkerThreads {
                    name: "main".to_string()
                },
                ValidationError::ZeroCapacity {
                    name: "main".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_negative_parallelism() {
        let mut cfg = config(vec![scheduler("main", 1, None)]);
        cfg.parallelism = -1;
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidParallelism { value: -1 }]);
    }

    #[test]
    fn test_multiple_errors() {
        let mut cfg = config(vec![]);
        cfg.parallelism = 0;
        cfg.dispatch_scheduler = Some("io".to_string());

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
