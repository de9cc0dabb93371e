//! Module for resolving the command line options into a checked configuration.
//!
//! The configuration is built once per invocation and contains:
//! - the remote backup host, user and password (the password can be read from a file).
//! - the warning and critical limits and the quota, all in gibibytes.
//! - the protocol used by lftp to reach the host (default sftp).
//! - the lftp path and the timeout for the lftp invocation.
//!
//! Missing required options are reported all at once, and stop the check with exit code 3.
//!
mod structs;
mod functions;

pub use structs::*;
