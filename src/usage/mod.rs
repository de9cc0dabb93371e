//! Module for measuring the space used on the remote backup host.
//!
//! The measurement runs lftp against `<protocol>://<host>` and issues `du -sb .` on the remote
//! directory. lftp prints the total number of bytes used, which is scraped from the output by
//! removing everything that is not a digit.
//!
//! The lftp program must be present: it is located before any network activity happens.
//! The password is handed to lftp via the `LFTP_PASSWORD` environment variable, and never via
//! the command line.
//!
mod structs;
mod functions;

pub use structs::*;
