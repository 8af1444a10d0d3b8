// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Profiling stages inserted around the processor.
//!
//! Producers are resolved once, when the pipeline is built. A boundary
//! without a producer gets no stage at all, so unconfigured profiling costs
//! nothing per event.

use futures::stream::{StreamExt, TryStreamExt};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

use crate::observability::messages::profiling::{ProfilingProducerFailed, ProfilingProducerPanicked};
use crate::observability::messages::StructuredLog;
use crate::observability::profiling::{ProfilingEventContext, ProfilingEventKind};
use crate::traits::{ComponentLocation, EventStream, ProfilingDataProducer, ProfilingService};

/// Identifies the processor and artifact an observation belongs to.
#[derive(Debug, Clone)]
pub struct ProfilingSite {
    pub location: ComponentLocation,
    pub artifact_id: String,
    pub artifact_type: String,
}

/// The data producer for each boundary, or `None` when not profiled.
#[derive(Clone, Default)]
pub struct BoundaryProducers {
    pre_dispatch: Option<Arc<dyn ProfilingDataProducer>>,
    pre_execution: Option<Arc<dyn ProfilingDataProducer>>,
    post_execution: Option<Arc<dyn ProfilingDataProducer>>,
    post_callback: Option<Arc<dyn ProfilingDataProducer>>,
}

impl BoundaryProducers {
    pub fn resolve(service: Option<&dyn ProfilingService>) -> Self {
        let Some(service) = service else {
            return Self::default();
        };
        Self {
            pre_dispatch: service.data_producer(ProfilingEventKind::PreDispatch),
            pre_execution: service.data_producer(ProfilingEventKind::PreExecution),
            post_execution: service.data_producer(ProfilingEventKind::PostExecution),
            post_callback: service.data_producer(ProfilingEventKind::PostCallback),
        }
    }

    pub fn get(&self, kind: ProfilingEventKind) -> Option<&Arc<dyn ProfilingDataProducer>> {
        match kind {
            ProfilingEventKind::PreDispatch => self.pre_dispatch.as_ref(),
            ProfilingEventKind::PreExecution => self.pre_execution.as_ref(),
            ProfilingEventKind::PostExecution => self.post_execution.as_ref(),
            ProfilingEventKind::PostCallback => self.post_callback.as_ref(),
        }
    }

    /// Number of boundaries with a producer.
    pub fn configured(&self) -> usize {
        ProfilingEventKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .count()
    }
}

/// Emit `kind` for every event flowing through `events`.
///
/// Failures pass through without an observation. Returns `events` untouched
/// when `producer` is `None`.
pub fn profile<E>(
    events: EventStream<E>,
    producer: Option<Arc<dyn ProfilingDataProducer>>,
    kind: ProfilingEventKind,
    site: Arc<ProfilingSite>,
) -> EventStream<E>
where
    E: Send + 'static,
{
    match producer {
        None => events,
        Some(producer) => events
            .inspect_ok(move |_| emit(producer.as_ref(), kind, &site))
            .boxed(),
    }
}

/// Hand one observation to `producer`, containing any error or panic.
pub fn emit(producer: &dyn ProfilingDataProducer, kind: ProfilingEventKind, site: &ProfilingSite) {
    let context = ProfilingEventContext {
        kind,
        location: &site.location,
        artifact_id: &site.artifact_id,
        artifact_type: &site.artifact_type,
        thread: std::thread::current(),
        triggered_at: SystemTime::now(),
    };

    match panic::catch_unwind(AssertUnwindSafe(|| producer.produce(&context))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => ProfilingProducerFailed {
            event_type: kind.event_type_name(),
            location: site.location.as_str(),
            error: &error,
        }
        .log(),
        Err(payload) => {
            let panic_message = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("<non-string panic payload>");
            ProfilingProducerPanicked {
                event_type: kind.event_type_name(),
                location: site.location.as_str(),
                panic_message,
            }
            .log();
        }
    }
}
