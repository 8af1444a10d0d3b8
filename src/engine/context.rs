// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline context carried alongside an event stream.
//!
//! The context is an immutable key/value map. "Appending" an entry returns a
//! new context sharing nothing mutable with the old one, so a processor and
//! any pipeline it nests see exactly the entries that were attached on the
//! way in.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::traits::SchedulerHandle;

/// Key under which a processing strategy publishes the scheduler the
/// processor may use for its own work.
pub const PROCESSOR_SCHEDULER_CONTEXT_KEY: &str = "processing_strategy.processor_scheduler";

#[derive(Clone)]
pub enum ContextValue {
    Scheduler(SchedulerHandle),
    Text(String),
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Scheduler(scheduler) => {
                f.debug_tuple("Scheduler").field(&scheduler.name()).finish()
            }
            ContextValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct PipelineContext {
    entries: Arc<HashMap<String, ContextValue>>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new context with `key` set to `value`, replacing any
    /// previous value for that key.
    pub fn with(&self, key: impl Into<String>, value: ContextValue) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(key.into(), value);
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn with_scheduler(&self, key: impl Into<String>, scheduler: SchedulerHandle) -> Self {
        self.with(key, ContextValue::Scheduler(scheduler))
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    pub fn scheduler(&self, key: &str) -> Option<SchedulerHandle> {
        match self.entries.get(key) {
            Some(ContextValue::Scheduler(scheduler)) => Some(scheduler.clone()),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(ContextValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// The scheduler published by the closest enclosing processing strategy.
    pub fn processor_scheduler(&self) -> Option<SchedulerHandle> {
        self.scheduler(PROCESSOR_SCHEDULER_CONTEXT_KEY)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
