/// Capacity of each channel crossing a scheduler handoff
pub const HANDOFF_BUFFER_SIZE: usize = 32;
/// Parallelism when the configuration does not set one (sequential)
pub const DEFAULT_PARALLELISM: i64 = 1;
/// Worker threads for a pool when the configuration does not set them
pub const DEFAULT_WORKER_THREADS: usize = 2;
/// Artifact type reported to profiling when the configuration does not set one
pub const DEFAULT_ARTIFACT_TYPE: &str = "application";
