use crate::device::DeviceOps;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Subdirectory of the app's data dir where WebView keeps its state
pub const WEBVIEW_DATA_SUBDIR: &str = "app_webview";

pub const NETLOG_FILE_NAME: &str = "netlog.json";

/// Default local destination, relative to the working directory
pub const DEFAULT_LOCAL_PATH: &str = "netlog.json";

/// Where the netlog is written on the device and where it lands on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub remote: String,
    pub local: PathBuf,
}

impl ArtifactPaths {
    pub fn new(data_dir: &str, local: impl Into<PathBuf>) -> Self {
        Self {
            remote: posix_join(&[data_dir, WEBVIEW_DATA_SUBDIR, NETLOG_FILE_NAME]),
            local: local.into(),
        }
    }

    /// Look up the package's data directory on the device
    pub async fn resolve<D: DeviceOps + ?Sized>(
        device: &D,
        package: &str,
        local: &Path,
    ) -> Result<Self> {
        let data_dir = device.application_data_dir(package).await?;
        Ok(Self::new(&data_dir, local))
    }

    /// The flag that makes the app record to `remote`
    pub fn capture_flag(&self) -> String {
        format!("--log-net-log={}", self.remote)
    }
}

fn posix_join(parts: &[&str]) -> String {
    let mut joined = String::new();
    for part in parts {
        if joined.is_empty() {
            joined.push_str(part.trim_end_matches('/'));
        } else {
            joined.push('/');
            joined.push_str(part.trim_matches('/'));
        }
    }
    joined
}
