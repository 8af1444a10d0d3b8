// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::ProfilingError;
use crate::observability::profiling::{ProfilingEventContext, ProfilingEventKind};

/// Receives one observation per event at a single pipeline boundary.
///
/// Must not block. Errors (and panics) are caught by the pipeline and
/// logged; they never reach the data path.
pub trait ProfilingDataProducer: Send + Sync {
    fn produce(&self, context: &ProfilingEventContext<'_>) -> Result<(), ProfilingError>;
}

/// Provides the data producer for each profiling boundary.
///
/// Queried once per boundary when a pipeline is built. Returning `None`
/// for a kind leaves that boundary uninstrumented.
pub trait ProfilingService: Send + Sync {
    fn data_producer(&self, kind: ProfilingEventKind) -> Option<Arc<dyn ProfilingDataProducer>>;
}
