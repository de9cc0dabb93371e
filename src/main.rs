//! check_backup_space: a monitoring plugin that checks the free space left on a remote backup quota.
//!
//! The plugin connects to the backup host with lftp, measures the space used, subtracts it from
//! the quota and compares the free space with the warning and critical limits.
//!
//! Exit codes: 0 = OK, 1 = WARNING, 2 = CRITICAL, 3 = usage error or failed check.
//!
use std::{path::PathBuf, process};
use clap::Parser;
use dotenv::dotenv;
use log::*;
use anyhow::Result;

mod configuration;
mod usage;
mod verdict;

use configuration::{Configuration, Protocol};
use usage::{TransferClient, UsageMeasurement};
use verdict::{ServiceState, Verdict};

const DEFAULT_LFTP: &str = "lftp";
const DEFAULT_TIMEOUT: u64 = 60;
const LICENSE: &str = "Released under the GNU GENERAL PUBLIC LICENSE Version 3.";

/// Check the free space left on a remote backup quota.
#[derive(Debug, Parser, Clone)]
#[command(disable_version_flag = true)]
pub struct Opts {
    /// Set backup host
    #[arg(short = 'H', long, value_name = "HOST")]
    host: Option<String>,
    /// Set user
    #[arg(short, long, value_name = "USER")]
    user: Option<String>,
    /// Set user password
    #[arg(short, long, value_name = "PASS")]
    password: Option<String>,
    /// Set space left warning limit in GB
    #[arg(short, long, value_name = "SIZE", allow_negative_numbers = true)]
    warning: Option<i64>,
    /// Set space left critical limit in GB
    #[arg(short, long, value_name = "SIZE", allow_negative_numbers = true)]
    critical: Option<i64>,
    /// Set maximum of your backup space capacity in GB
    #[arg(short, long, value_name = "SIZE", allow_negative_numbers = true)]
    maximum: Option<i64>,
    /// Read password from file
    #[arg(short, long, value_name = "/etc/nagios/password")]
    file: Option<PathBuf>,
    /// Set protocol to determine disk usage (default sftp)
    #[arg(long, value_enum, value_name = "PROTO")]
    protocol: Option<Protocol>,
    /// Set the lftp program path (default: lftp found via PATH)
    #[arg(long, value_name = "PATH")]
    lftp: Option<String>,
    /// Set the maximum number of seconds to wait for lftp (default 60)
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,
    /// Run verbosely
    #[arg(long, overrides_with = "no_verbose")]
    verbose: bool,
    /// Do not run verbosely
    #[arg(long, overrides_with = "verbose")]
    no_verbose: bool,
    /// Show version
    #[arg(short, long)]
    version: bool,
}

async fn check(
    configuration: &Configuration,
) -> Result<(Verdict, UsageMeasurement)>
{
    let transfer_client = TransferClient::locate(&configuration.lftp)?;
    let measurement = UsageMeasurement::measure(&transfer_client, configuration).await?;
    info!("disk usage: {} bytes, free space: {} GB", measurement.disk_usage, measurement.free_space);

    let verdict = Verdict::classify(measurement.free_space, configuration.warning, configuration.critical);
    Ok((verdict, measurement))
}

#[tokio::main]
async fn main() {
    let options = match Opts::try_parse() {
        Ok(options) => options,
        Err(error) => {
            // help is printed to stdout and is not an error
            let exit_code = if error.use_stderr() { ServiceState::Unknown.exit_code() } else { 0 };
            let _ = error.print();
            process::exit(exit_code);
        }
    };

    if options.version {
        println!("{} - v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        println!("{}", LICENSE);
        process::exit(ServiceState::Unknown.exit_code());
    }

    let default_filter = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
    dotenv().ok();

    let configuration = match Configuration::from_opts(&options) {
        Ok(configuration) => configuration,
        Err(error) => {
            println!("{:#}", error);
            process::exit(ServiceState::Unknown.exit_code());
        }
    };
    if configuration.verbose {
        debug!("{:?}", configuration);
    }

    match check(&configuration).await {
        Ok((verdict, measurement)) => {
            println!("{}", verdict.status_line(measurement.free_space, configuration.quota, configuration.warning, configuration.critical));
            process::exit(verdict.exit_code);
        }
        Err(error) => {
            println!("BACKUP_SPACE {} - {:#}", ServiceState::Unknown, error);
            process::exit(ServiceState::Unknown.exit_code());
        }
    }
}
