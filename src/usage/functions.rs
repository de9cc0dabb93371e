//! The impls and functions
//!
use std::{env, path::{Path, PathBuf}, process::Stdio, time::Instant};
use log::*;
use anyhow::{bail, Context, Result};
use regex::Regex;
use secrecy::ExposeSecret;
use tokio::{process::Command, time::timeout};
use crate::configuration::Configuration;
use crate::usage::{TransferClient, UsageMeasurement};

/// The lftp commands: recursive byte count of the remote directory, then disconnect.
const DISK_USAGE_COMMANDS: &str = "du -sb .; exit";

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

impl TransferClient {
    /// Locate lftp before anything else happens.
    ///
    /// A name containing a path separator must point to an existing file,
    /// a bare name is searched in every directory of PATH.
    pub fn locate(
        lftp: &str,
    ) -> Result<TransferClient>
    {
        let candidate = Path::new(lftp);
        if candidate.components().count() > 1 {
            if candidate.is_file() {
                debug!("lftp found at: {}", candidate.display());
                return Ok(TransferClient { path: candidate.to_path_buf() });
            }
            bail!("{} program is missing", lftp);
        }

        env::var_os("PATH")
            .iter()
            .flat_map(|paths| env::split_paths(paths).collect::<Vec<PathBuf>>())
            .map(|directory| directory.join(lftp))
            .find(|path| path.is_file())
            .map(|path| {
                debug!("lftp found at: {}", path.display());
                TransferClient { path }
            })
            .with_context(|| format!("{} program is missing", lftp))
    }
    fn arguments(
        configuration: &Configuration,
    ) -> Vec<String>
    {
        vec![
            "-u".to_string(),
            configuration.user.clone(),
            "--env-password".to_string(),
            format!("{}://{}", configuration.protocol, configuration.host),
            "-e".to_string(),
            DISK_USAGE_COMMANDS.to_string(),
        ]
    }
    /// Run lftp and return the number of bytes used on the remote host.
    ///
    /// The child is killed when the timeout expires or when anything returns early.
    pub async fn disk_usage(
        &self,
        configuration: &Configuration,
    ) -> Result<f64>
    {
        info!("begin disk usage");
        let timer = Instant::now();

        let child = Command::new(&self.path)
            .args(TransferClient::arguments(configuration))
            .env("LFTP_PASSWORD", configuration.password.expose_secret())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Error starting: {}", self.path.display()))?;

        let output = timeout(configuration.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("{} did not finish within {} seconds", self.path.display(), configuration.timeout.as_secs()))?
            .with_context(|| format!("Error waiting for: {}", self.path.display()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("lftp stderr: {}", stderr.trim());
        }
        if !output.status.success() {
            bail!("{} failed ({}): {}", self.path.display(), output.status, last_line(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("lftp stdout: {}", stdout.trim());
        let disk_usage = parse_disk_usage(&stdout);

        info!("end disk usage: {:?}", timer.elapsed());
        Ok(disk_usage)
    }
}

impl UsageMeasurement {
    pub async fn measure(
        transfer_client: &TransferClient,
        configuration: &Configuration,
    ) -> Result<UsageMeasurement>
    {
        let disk_usage = transfer_client.disk_usage(configuration).await?;
        Ok(UsageMeasurement::new(configuration.quota, disk_usage))
    }
    pub fn new(
        quota: i64,
        disk_usage: f64,
    ) -> Self
    {
        UsageMeasurement {
            disk_usage,
            free_space: calculate_free_space(quota, disk_usage),
        }
    }
}

/// Remove every non-digit character, and read what is left as a number of bytes.
///
/// Output without any digits counts as zero bytes used.
pub fn parse_disk_usage(
    output: &str,
) -> f64
{
    let non_digits = Regex::new(r"\D").unwrap();
    let digits = non_digits.replace_all(output, "");
    digits.parse::<f64>().unwrap_or(0.0)
}

/// The last non-empty line of the output, so an error stays on the single status line.
fn last_line(
    output: &str,
) -> &str
{
    output.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default()
}

/// Free space in gibibytes, negative if the quota is exceeded.
pub fn calculate_free_space(
    quota: i64,
    disk_usage: f64,
) -> f64
{
    quota as f64 - disk_usage / BYTES_PER_GIB
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, os::unix::fs::PermissionsExt, time::Duration};
    use secrecy::SecretString;
    use crate::configuration::Protocol;

    fn write_fake_lftp(name: &str, script: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("check_backup_space_lftp_{}_{}", name, std::process::id()));
        fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn configuration(lftp: &Path, timeout: Duration) -> Configuration {
        Configuration {
            host: "backup.example.com".to_string(),
            user: "backup".to_string(),
            password: SecretString::from("secret".to_string()),
            quota: 100,
            warning: 20,
            critical: 10,
            protocol: Protocol::Sftp,
            verbose: false,
            lftp: lftp.display().to_string(),
            timeout,
        }
    }

    #[test]
    fn unit_parse_du_output() {
        assert_eq!(parse_disk_usage("total 5368709120 bytes\n"), 5368709120.0);
        assert_eq!(parse_disk_usage("5368709120\t.\n"), 5368709120.0);
    }

    #[test]
    fn unit_parse_output_without_digits() {
        assert_eq!(parse_disk_usage(""), 0.0);
        assert_eq!(parse_disk_usage("Login failed\n"), 0.0);
    }

    #[test]
    fn unit_free_space_in_gibibytes() {
        assert_eq!(calculate_free_space(100, 1073741824.0), 99.0);
        assert_eq!(calculate_free_space(100, 0.0), 100.0);
        // usage over quota
        assert_eq!(calculate_free_space(1, 2147483648.0), -1.0);
    }

    #[test]
    fn unit_measurement_from_disk_usage() {
        let measurement = UsageMeasurement::new(100, 85.0 * BYTES_PER_GIB);
        assert_eq!(measurement.disk_usage, 91268055040.0);
        assert_eq!(measurement.free_space, 15.0);
    }

    #[test]
    fn unit_arguments_do_not_contain_password() {
        let configuration = configuration(Path::new("/usr/bin/lftp"), Duration::from_secs(1));
        let arguments = TransferClient::arguments(&configuration);
        assert_eq!(arguments, vec!["-u", "backup", "--env-password", "sftp://backup.example.com", "-e", "du -sb .; exit"]);
        assert!(!arguments.iter().any(|argument| argument.contains("secret")));
    }

    #[test]
    fn unit_last_line_of_stderr() {
        assert_eq!(last_line("mirror: Access failed\n\nLogin failed: 530 Login incorrect.\n  \n"), "Login failed: 530 Login incorrect.");
        assert_eq!(last_line(""), "");
    }

    #[test]
    fn unit_locate_missing_path() {
        let error = TransferClient::locate("/nonexistent/bin/lftp").unwrap_err();
        assert_eq!(error.to_string(), "/nonexistent/bin/lftp program is missing");
    }

    #[test]
    fn unit_locate_missing_on_path() {
        assert!(TransferClient::locate("check_backup_space_no_such_program").is_err());
    }

    #[test]
    fn unit_locate_existing_path() {
        let path = write_fake_lftp("locate", "exit 0");
        let transfer_client = TransferClient::locate(&path.display().to_string()).unwrap();
        assert_eq!(transfer_client.path, path);
        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn unit_measure_with_fake_lftp() {
        let path = write_fake_lftp("measure", r#"[ "$1" = "-u" ] && [ "$2" = "backup" ] || exit 1
[ "$LFTP_PASSWORD" = "secret" ] || exit 1
printf '91268055040\t.\n'"#);
        let configuration = configuration(&path, Duration::from_secs(10));
        let transfer_client = TransferClient::locate(&configuration.lftp).unwrap();

        let measurement = UsageMeasurement::measure(&transfer_client, &configuration).await.unwrap();
        assert_eq!(measurement.disk_usage, 91268055040.0);
        assert_eq!(measurement.free_space, 15.0);
        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn unit_measure_failing_lftp() {
        let path = write_fake_lftp("failing", "echo 'cd: Access failed' >&2\necho 'Login failed: 530' >&2\nexit 1");
        let configuration = configuration(&path, Duration::from_secs(10));
        let transfer_client = TransferClient::locate(&configuration.lftp).unwrap();

        let error = UsageMeasurement::measure(&transfer_client, &configuration).await.unwrap_err();
        let message = format!("{:#}", error);
        assert!(message.ends_with("Login failed: 530"));
        assert!(!message.contains('\n'));
        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn unit_measure_hanging_lftp() {
        let path = write_fake_lftp("hanging", "sleep 10");
        let configuration = configuration(&path, Duration::from_millis(200));
        let transfer_client = TransferClient::locate(&configuration.lftp).unwrap();

        let timer = Instant::now();
        let error = UsageMeasurement::measure(&transfer_client, &configuration).await.unwrap_err();
        assert!(error.to_string().contains("did not finish"));
        assert!(timer.elapsed() < Duration::from_secs(5));
        fs::remove_file(path).unwrap();
    }
}
