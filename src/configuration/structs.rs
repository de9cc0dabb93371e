//! The structs
//!
use std::{fmt, time::Duration};
use secrecy::SecretString;

/// The protocol lftp uses to connect to the backup host.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Sftp,
    Ftp,
    Ssh,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Sftp => write!(f, "sftp"),
            Protocol::Ftp => write!(f, "ftp"),
            Protocol::Ssh => write!(f, "ssh"),
        }
    }
}

/// The resolved configuration for a single check.
///
/// All sizes are in gibibytes.
/// The password is kept as a secret, so it does not show up in debug output.
#[derive(Debug)]
pub struct Configuration {
    pub host: String,
    pub user: String,
    pub password: SecretString,
    pub quota: i64,
    pub warning: i64,
    pub critical: i64,
    pub protocol: Protocol,
    pub verbose: bool,
    /// lftp program name or path, searched on PATH if it is a bare name.
    pub lftp: String,
    pub timeout: Duration,
}
