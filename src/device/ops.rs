use crate::adb::{shell_quote, FileTransfer, ShellCommand, ShellOutput};
use crate::core::types::DeviceId;
use crate::device::process::{self, ProcessInfo};
use crate::error::{NetlogError, Result};
use crate::progress::ProgressReporter;
use async_trait::async_trait;
use log::*;
use rand::{distr::Alphanumeric, Rng};
use regex::Regex;
use std::path::Path;
use std::sync::{LazyLock, OnceLock};

static RE_DATA_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*dataDir=(\S+)\s*$").unwrap());

const FLAG_FILE_MODE: u32 = 0o644;
const DEVICE_TEMP_DIR: &str = "/data/local/tmp";

/// Device operations the flag store and capture depend on
#[async_trait]
pub trait DeviceOps: Send + Sync {
    fn serial(&self) -> &DeviceId;

    /// Processes whose name contains `name`
    async fn list_processes(&self, name: &str) -> Result<Vec<ProcessInfo>>;

    /// The package's private data directory, e.g. `/data/user/0/<pkg>`
    async fn application_data_dir(&self, package: &str) -> Result<String>;

    /// Contents of a shell-readable file, `None` if it does not exist
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;

    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// `rm -f`, so a missing path is not an error
    async fn remove_path(&self, path: &str, as_root: bool) -> Result<()>;

    /// Copy a remote file to the host, returning the byte count
    async fn pull_file(
        &self,
        remote: &str,
        local: &Path,
        as_root: bool,
        progress: Box<dyn ProgressReporter>,
    ) -> Result<u64>;
}

/// A device reached through the local ADB server
pub struct AdbDevice {
    host: String,
    port: u16,
    serial: DeviceId,
    shell_is_root: OnceLock<bool>,
}

impl AdbDevice {
    pub fn new(host: impl Into<String>, port: u16, serial: DeviceId) -> Self {
        Self {
            host: host.into(),
            port,
            serial,
            shell_is_root: OnceLock::new(),
        }
    }

    async fn shell(&self, command: &str) -> Result<ShellOutput> {
        ShellCommand::new(command)
            .with_device(self.serial.clone())
            .execute(&self.host, self.port)
            .await
    }

    async fn shell_checked(&self, command: &str) -> Result<ShellOutput> {
        ShellCommand::new(command)
            .with_device(self.serial.clone())
            .execute_checked(&self.host, self.port)
            .await
    }

    /// Whether adbd already runs as root (`adb root`)
    async fn is_root(&self) -> Result<bool> {
        if let Some(root) = self.shell_is_root.get() {
            return Ok(*root);
        }
        let output = self.shell_checked("id -u").await?;
        let root = output.stdout.trim() == "0";
        debug!("Device shell runs as root: {}", root);
        Ok(*self.shell_is_root.get_or_init(|| root))
    }

    async fn root_command(&self, command: &str) -> Result<String> {
        if self.is_root().await? {
            Ok(command.to_string())
        } else {
            Ok(format!("su 0 sh -c {}", shell_quote(command)))
        }
    }

    async fn transfer(&self) -> Result<FileTransfer> {
        FileTransfer::new(&self.host, self.port, Some(&self.serial)).await
    }

    fn temp_path() -> String {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!("{}/netlog_pull_{}", DEVICE_TEMP_DIR, suffix)
    }
}

#[async_trait]
impl DeviceOps for AdbDevice {
    fn serial(&self) -> &DeviceId {
        &self.serial
    }

    async fn list_processes(&self, name: &str) -> Result<Vec<ProcessInfo>> {
        let mut processes = process::parse_ps(&self.shell("ps -A").await?.stdout);
        if processes.is_empty() {
            // Pre-O toolbox ps rejects -A and lists nothing.
            processes = process::parse_ps(&self.shell("ps").await?.stdout);
        }
        Ok(process::matching(&processes, name).cloned().collect())
    }

    async fn application_data_dir(&self, package: &str) -> Result<String> {
        let output = self
            .shell_checked(&format!("dumpsys package {}", shell_quote(package)))
            .await?;
        parse_data_dir(&output.stdout).ok_or_else(|| NetlogError::PackageNotFound(package.to_string()))
    }

    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.transfer().await?.read(path)
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.transfer().await?.write(path, contents, FLAG_FILE_MODE)
    }

    async fn remove_path(&self, path: &str, as_root: bool) -> Result<()> {
        let command = format!("rm -f {}", shell_quote(path));
        let command = if as_root {
            self.root_command(&command).await?
        } else {
            command
        };
        self.shell_checked(&command).await?;
        Ok(())
    }

    async fn pull_file(
        &self,
        remote: &str,
        local: &Path,
        as_root: bool,
        progress: Box<dyn ProgressReporter>,
    ) -> Result<u64> {
        if !as_root || self.is_root().await? {
            let mut transfer = self.transfer().await?;
            transfer.set_progress_reporter(progress);
            return transfer.pull(remote, local);
        }

        // Files owned by the app's uid are unreadable to the shell user, so
        // stage a world-readable copy first.
        let staged = Self::temp_path();
        let copy = format!(
            "cp {src} {dst} && chmod 644 {dst}",
            src = shell_quote(remote),
            dst = shell_quote(&staged)
        );
        self.shell_checked(&self.root_command(&copy).await?).await?;

        let pulled = async {
            let mut transfer = self.transfer().await?;
            transfer.set_progress_reporter(progress);
            transfer.pull(&staged, local)
        }
        .await;

        if let Err(e) = self.remove_path(&staged, true).await {
            warn!("Failed to remove staged copy {}: {}", staged, e);
        }

        pulled
    }
}

/// Extract `dataDir=` from `dumpsys package` output
pub fn parse_data_dir(dumpsys: &str) -> Option<String> {
    RE_DATA_DIR
        .captures(dumpsys)
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_dir() {
        let dumpsys = "Packages:\n  Package [com.example.app] (1a2b3c):\n    userId=10123\n    codePath=/data/app/~~x==/com.example.app-y==\n    dataDir=/data/user/0/com.example.app\n    versionName=1.0\n";
        assert_eq!(
            parse_data_dir(dumpsys).as_deref(),
            Some("/data/user/0/com.example.app")
        );
    }

    #[test]
    fn test_parse_data_dir_missing_package() {
        assert_eq!(parse_data_dir("Dexopt state:\n  Unable to find package: com.nope\n"), None);
    }

    #[test]
    fn test_temp_path_is_under_data_local_tmp() {
        let a = AdbDevice::temp_path();
        let b = AdbDevice::temp_path();
        assert!(a.starts_with("/data/local/tmp/netlog_pull_"));
        assert_eq!(a.len(), "/data/local/tmp/netlog_pull_".len() + 8);
        assert_ne!(a, b);
    }
}
