// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading.

use std::fmt::{Display, Formatter};

/// A configuration file was loaded and validated.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub artifact_id: &'a str,
    pub scheduler_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded config '{}' for artifact '{}': {} schedulers",
            self.path, self.artifact_id, self.scheduler_count
        )
    }
}
