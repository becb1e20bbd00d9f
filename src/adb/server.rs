use crate::adb::connection::AdbConnection;
use crate::error::{NetlogError, Result};
use log::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::sleep;

const SERVER_START_DELAY: Duration = Duration::from_secs(1);
const SERVER_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

static ADB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// ADB server management
pub struct AdbServer;

impl AdbServer {
    /// Use `path` to start the server. Only the first call takes effect.
    pub fn set_adb_path(path: PathBuf) {
        if let Err(ignored) = ADB_PATH.set(path) {
            debug!("adb path already set, ignoring {}", ignored.display());
        }
    }

    /// The adb binary: `set_adb_path`, then `ADB_PATH`, then `adb` on PATH
    pub fn adb_command() -> PathBuf {
        resolve_adb_command(
            ADB_PATH.get().map(PathBuf::as_path),
            std::env::var_os("ADB_PATH"),
        )
    }

    /// Start the ADB server
    pub async fn start(port: u16) -> Result<()> {
        info!("Starting ADB server on port {}", port);

        let adb = Self::adb_command();
        debug!("Using adb at {}", adb.display());
        let output = Command::new(&adb)
            .args(["-P", &port.to_string(), "start-server"])
            .output()
            .await
            .map_err(|e| NetlogError::Server(format!("Failed to execute adb command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NetlogError::Server(format!(
                "Failed to start ADB server: {}",
                stderr.trim()
            )));
        }

        info!("ADB server started successfully");

        // Give the server time to fully start
        sleep(SERVER_START_DELAY).await;

        Ok(())
    }

    /// Check if the ADB server is accepting connections
    pub async fn is_running(host: &str, port: u16) -> bool {
        let address = format!("{}:{}", host, port);

        match tokio::time::timeout(
            SERVER_CHECK_TIMEOUT,
            tokio::net::TcpStream::connect(address.as_str()),
        )
        .await
        {
            Ok(Ok(_)) => {
                debug!("ADB server is running at {}", address);
                true
            }
            _ => {
                debug!("ADB server is not running at {}", address);
                false
            }
        }
    }

    /// Raw `host:devices-l` listing
    pub async fn list_devices(host: &str, port: u16) -> Result<String> {
        let mut conn = AdbConnection::connect(host, port).await?;
        conn.send_command("host:devices-l")?;
        conn.read_okay()?;
        conn.read_length_prefixed()
    }
}

fn resolve_adb_command(configured: Option<&Path>, env: Option<OsString>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("adb"))
}
