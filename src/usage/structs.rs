//! The structs
//!
use std::path::PathBuf;

/// The located lftp program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferClient {
    pub path: PathBuf,
}

/// The result of a single disk usage measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageMeasurement {
    /// bytes used, as reported by `du -sb`.
    pub disk_usage: f64,
    /// quota minus usage in gibibytes, negative if the quota is exceeded.
    pub free_space: f64,
}
