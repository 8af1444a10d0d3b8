// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Profiling boundaries and the bundled profiling services.
//!
//! A processing strategy can be observed at four boundaries, always crossed
//! in this order for a given event:
//!
//! ```text
//! PreDispatch -> [dispatch handoff] -> PreExecution -> processor
//!     -> PostExecution -> [callback handoff] -> PostCallback
//! ```
//!
//! Bracketing the handoffs (not just the processor call) is what makes
//! scheduling latency measurable.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::Thread;
use std::time::SystemTime;

use crate::errors::ProfilingError;
use crate::observability::messages::profiling::BoundaryObserved;
use crate::observability::messages::StructuredLog;
use crate::traits::{ComponentLocation, ProfilingDataProducer, ProfilingService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilingEventKind {
    /// Before handing the event to the dispatch scheduler
    PreDispatch,
    /// On the dispatch scheduler, right before the processor
    PreExecution,
    /// Right after the processor produced the event
    PostExecution,
    /// On the callback scheduler, after the callback handoff
    PostCallback,
}

impl ProfilingEventKind {
    pub const ALL: [ProfilingEventKind; 4] = [
        ProfilingEventKind::PreDispatch,
        ProfilingEventKind::PreExecution,
        ProfilingEventKind::PostExecution,
        ProfilingEventKind::PostCallback,
    ];

    /// Name of the profiling event type reported for this boundary.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ProfilingEventKind::PreDispatch => "ps-scheduling-operation-execution",
            ProfilingEventKind::PreExecution => "starting-operation-execution",
            ProfilingEventKind::PostExecution => "operation-executed",
            ProfilingEventKind::PostCallback => "ps-flow-message-passing",
        }
    }
}

/// What a data producer learns about one boundary crossing.
#[derive(Debug, Clone)]
pub struct ProfilingEventContext<'a> {
    pub kind: ProfilingEventKind,
    pub location: &'a ComponentLocation,
    pub artifact_id: &'a str,
    pub artifact_type: &'a str,
    pub thread: Thread,
    pub triggered_at: SystemTime,
}

impl ProfilingEventContext<'_> {
    pub fn thread_name(&self) -> &str {
        self.thread.name().unwrap_or("<unnamed>")
    }
}

/// Logs every boundary crossing through `tracing` at debug level.
pub struct TracingProfilingService {
    kinds: HashSet<ProfilingEventKind>,
}

impl TracingProfilingService {
    pub fn new() -> Self {
        Self::for_kinds(&ProfilingEventKind::ALL)
    }

    pub fn for_kinds(kinds: &[ProfilingEventKind]) -> Self {
        Self {
            kinds: kinds.iter().copied().collect(),
        }
    }
}

impl Default for TracingProfilingService {
    fn default() -> Self {
        Self::new()
    }
}

struct TracingDataProducer;

impl ProfilingDataProducer for TracingDataProducer {
    fn produce(&self, context: &ProfilingEventContext<'_>) -> Result<(), ProfilingError> {
        BoundaryObserved {
            event_type: context.kind.event_type_name(),
            location: context.location.as_str(),
            artifact_id: context.artifact_id,
            artifact_type: context.artifact_type,
            thread_name: context.thread_name(),
        }
        .log();
        Ok(())
    }
}

impl ProfilingService for TracingProfilingService {
    fn data_producer(&self, kind: ProfilingEventKind) -> Option<Arc<dyn ProfilingDataProducer>> {
        if self.kinds.contains(&kind) {
            Some(Arc::new(TracingDataProducer))
        } else {
            None
        }
    }
}

/// An owned copy of one boundary crossing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilingRecord {
    pub kind: ProfilingEventKind,
    pub location: String,
    pub artifact_id: String,
    pub artifact_type: String,
    pub thread_name: Option<String>,
    pub triggered_at: SystemTime,
}

/// Keeps every boundary crossing in memory.
///
/// Clones share the same record buffer, so one clone can be handed to a
/// builder while another is inspected afterwards.
#[derive(Clone)]
pub struct RecordingProfilingService {
    kinds: HashSet<ProfilingEventKind>,
    records: Arc<Mutex<Vec<ProfilingRecord>>>,
}

impl RecordingProfilingService {
    pub fn new() -> Self {
        Self::for_kinds(&ProfilingEventKind::ALL)
    }

    pub fn for_kinds(kinds: &[ProfilingEventKind]) -> Self {
        Self {
            kinds: kinds.iter().copied().collect(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn records(&self) -> Vec<ProfilingRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, kind: ProfilingEventKind) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|record| record.kind == kind)
            .count()
    }
}

impl Default for RecordingProfilingService {
    fn default() -> Self {
        Self::new()
    }
}

struct RecordingDataProducer {
    records: Arc<Mutex<Vec<ProfilingRecord>>>,
}

impl ProfilingDataProducer for RecordingDataProducer {
    fn produce(&self, context: &ProfilingEventContext<'_>) -> Result<(), ProfilingError> {
        let record = ProfilingRecord {
            kind: context.kind,
            location: context.location.to_string(),
            artifact_id: context.artifact_id.to_string(),
            artifact_type: context.artifact_type.to_string(),
            thread_name: context.thread.name().map(str::to_string),
            triggered_at: context.triggered_at,
        };
        self.records
            .lock()
            .map_err(|_| ProfilingError::new("record buffer poisoned"))?
            .push(record);
        Ok(())
    }
}

impl ProfilingService for RecordingProfilingService {
    fn data_producer(&self, kind: ProfilingEventKind) -> Option<Arc<dyn ProfilingDataProducer>> {
        if !self.kinds.contains(&kind) {
            return None;
        }
        Some(Arc::new(RecordingDataProducer {
            records: self.records.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(kind: ProfilingEventKind, location: &'a ComponentLocation) -> ProfilingEventContext<'a> {
        ProfilingEventContext {
            kind,
            location,
            artifact_id: "orders-app",
            artifact_type: "app",
            thread: std::thread::current(),
            triggered_at: SystemTime::now(),
        }
    }

    #[test]
    fn recording_service_only_provides_configured_kinds() {
        let service = RecordingProfilingService::for_kinds(&[ProfilingEventKind::PreDispatch]);
        assert!(service.data_producer(ProfilingEventKind::PreDispatch).is_some());
        assert!(service.data_producer(ProfilingEventKind::PostCallback).is_none());
    }

    #[test]
    fn recording_service_clones_share_records() {
        let service = RecordingProfilingService::new();
        let observer = service.clone();
        let location = ComponentLocation::new("orders/processors/0");

        let producer = service
            .data_producer(ProfilingEventKind::PostExecution)
            .unwrap();
        producer
            .produce(&context(ProfilingEventKind::PostExecution, &location))
            .unwrap();

        let records = observer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "orders/processors/0");
        assert_eq!(records[0].artifact_id, "orders-app");
        assert_eq!(observer.count(ProfilingEventKind::PostExecution), 1);
        assert_eq!(observer.count(ProfilingEventKind::PreDispatch), 0);
    }

    #[test]
    fn tracing_service_produces_without_error() {
        let service = TracingProfilingService::for_kinds(&[ProfilingEventKind::PreExecution]);
        let location = ComponentLocation::new("orders/processors/0");
        let producer = service
            .data_producer(ProfilingEventKind::PreExecution)
            .unwrap();
        assert!(producer
            .produce(&context(ProfilingEventKind::PreExecution, &location))
            .is_ok());
        assert!(service.data_producer(ProfilingEventKind::PreDispatch).is_none());
    }

    #[test]
    fn kinds_deserialize_from_snake_case() {
        let kinds: Vec<ProfilingEventKind> =
            serde_yaml::from_str("[pre_dispatch, post_callback]").unwrap();
        assert_eq!(
            kinds,
            vec![ProfilingEventKind::PreDispatch, ProfilingEventKind::PostCallback]
        );
    }
}
