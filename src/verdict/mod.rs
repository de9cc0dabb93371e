//! Module for classifying the free space against the warning and critical limits.
//!
mod structs;
mod functions;

pub use structs::*;
