//! The impls and functions
//!
use std::{env, fs, path::Path, time::Duration};
use log::*;
use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use crate::configuration::Configuration;
use crate::Opts;
use crate::{DEFAULT_LFTP, DEFAULT_TIMEOUT};

impl Configuration {
    /// Create the configuration from the parsed command line options.
    ///
    /// - all missing required options are reported together.
    /// - the quota is checked after the other required options.
    /// - if a password file is set, it takes precedence over the password option.
    pub fn from_opts(
        options: &Opts,
    ) -> Result<Configuration>
    {
        let missing = missing_arguments(options);

        let (host, user, warning, critical) = match (&options.host, &options.user, options.warning, options.critical) {
            (Some(host), Some(user), Some(warning), Some(critical)) if missing.is_empty() => (host.clone(), user.clone(), warning, critical),
            _ => bail!("Missing arguments for {}.", missing.join(", ")),
        };
        let quota = options.maximum
            .context("Missing arguments for maximum.")?;

        let password = resolve_password(options.file.as_deref(), options.password.as_deref())?;
        let protocol = options.protocol.unwrap_or_default();
        let lftp = set_lftp(&options.lftp);
        let timeout = set_timeout(&options.timeout)?;

        Ok(Configuration {
            host,
            user,
            password,
            quota,
            warning,
            critical,
            protocol,
            verbose: options.verbose && !options.no_verbose,
            lftp,
            timeout,
        })
    }
}

/// Returns the names of the required options that are not set, in reporting order.
///
/// The password counts as present if either the password or the password file is set.
pub fn missing_arguments(
    options: &Opts,
) -> Vec<&'static str>
{
    let mut missing_arguments = Vec::new();

    if options.user.is_none() { missing_arguments.push("user") };
    if options.password.is_none() && options.file.is_none() { missing_arguments.push("password") };
    if options.host.is_none() { missing_arguments.push("host") };
    if options.warning.is_none() { missing_arguments.push("warning limit") };
    if options.critical.is_none() { missing_arguments.push("critical limit") };

    missing_arguments
}

fn resolve_password(
    file: Option<&Path>,
    password: Option<&str>,
) -> Result<SecretString>
{
    match (file, password) {
        (Some(file), _) => read_password(file),
        (None, Some(password)) => Ok(SecretString::from(password.to_string())),
        (None, None) => bail!("Missing arguments for password."),
    }
}

/// Read the password from a file, removing a single trailing `\r\n`, `\n` or `\r`.
pub fn read_password(
    file: &Path,
) -> Result<SecretString>
{
    debug!("reading password from: {}", file.display());
    let content = fs::read_to_string(file)
        .with_context(|| format!("Error reading password file: {}", file.display()))?;
    let password = content.strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .or_else(|| content.strip_suffix('\r'))
        .unwrap_or(content.as_str());
    Ok(SecretString::from(password.to_string()))
}

pub fn set_lftp(
    option: &Option<String>,
) -> String
{
    // is --lftp set?
    match option {
        Some(lftp) => {
            info!("lftp argument set: using: {}", lftp);
            lftp.to_string()
        }
        // is the environment variable CHECK_BACKUP_SPACE_LFTP set (via dotenv().ok())?
        None => match env::var("CHECK_BACKUP_SPACE_LFTP") {
            Ok(set_var) => {
                info!("lftp not set: set via .env: CHECK_BACKUP_SPACE_LFTP: {}", set_var);
                set_var
            }
            Err(_e) => {
                info!("lftp not set: and not set via .env: using DEFAULT_LFTP: {}", DEFAULT_LFTP);
                DEFAULT_LFTP.to_string()
            }
        },
    }
}

pub fn set_timeout(
    option: &Option<u64>,
) -> Result<Duration>
{
    // is --timeout/-t set?
    let seconds = match option {
        Some(seconds) => {
            info!("timeout argument set: using: {}", seconds);
            *seconds
        }
        // is the environment variable CHECK_BACKUP_SPACE_TIMEOUT set (via dotenv().ok())?
        None => match env::var("CHECK_BACKUP_SPACE_TIMEOUT") {
            Ok(set_var) => {
                info!("timeout not set: set via .env: CHECK_BACKUP_SPACE_TIMEOUT: {}", set_var);
                set_var.parse::<u64>()
                    .with_context(|| format!("Invalid CHECK_BACKUP_SPACE_TIMEOUT value: {}", set_var))?
            }
            Err(_e) => {
                info!("timeout not set: and not set via .env: using DEFAULT_TIMEOUT: {}", DEFAULT_TIMEOUT);
                DEFAULT_TIMEOUT
            }
        },
    };
    if seconds == 0 {
        bail!("Invalid timeout: must be at least 1 second.");
    }
    Ok(Duration::from_secs(seconds))
}
