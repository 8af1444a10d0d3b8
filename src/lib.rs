// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // schedulers and processors
pub mod config;     // config files + runtime wiring
pub mod engine;     // pipeline assembly
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // unified abstractions
