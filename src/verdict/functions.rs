//! The impls and functions
//!
use crate::verdict::{ServiceState, Verdict};

impl ServiceState {
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }
}

impl Verdict {
    /// Classify the free space.
    ///
    /// Free space equal to a limit does not trigger that limit.
    /// The warning limit is expected to be higher than the critical limit, this is not checked.
    pub fn classify(
        free_space: f64,
        warning: i64,
        critical: i64,
    ) -> Verdict
    {
        let label = if free_space < warning as f64 {
            if free_space < critical as f64 {
                ServiceState::Critical
            } else {
                ServiceState::Warning
            }
        } else {
            ServiceState::Ok
        };

        Verdict { label, exit_code: label.exit_code() }
    }
    /// The single status line for the monitoring system, free space is truncated to whole gibibytes.
    pub fn status_line(
        &self,
        free_space: f64,
        quota: i64,
        warning: i64,
        critical: i64,
    ) -> String
    {
        format!("BACKUP_SPACE {} - free space: {}GB of {}GB (w: {}GB c: {}GB)", self.label, free_space.trunc() as i64, quota, warning, critical)
    }
}
