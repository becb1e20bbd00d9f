use crate::device::DeviceOps;
use crate::error::{FlagOp, NetlogError, Result};
use crate::flags::format;
use log::*;

/// Directory holding command-line files on the device
pub const COMMAND_LINE_DIR: &str = "/data/local/tmp";

/// Command-line file read by WebView at startup
pub const WEBVIEW_COMMAND_LINE: &str = "webview-command-line";

/// Flag file as it was found on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSnapshot {
    /// `None` when the file did not exist
    raw: Option<Vec<u8>>,
    flags: Vec<String>,
}

impl FlagSnapshot {
    /// A store with no file
    pub fn missing() -> Self {
        Self {
            raw: None,
            flags: Vec::new(),
        }
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }
}

/// Reads and writes the persisted flag list named by `key`
pub struct FlagStore<'d, D: DeviceOps + ?Sized> {
    device: &'d D,
    path: String,
}

impl<'d, D: DeviceOps + ?Sized> FlagStore<'d, D> {
    pub fn new(device: &'d D, key: &str) -> Self {
        Self {
            device,
            path: format!("{}/{}", COMMAND_LINE_DIR, key),
        }
    }

    pub fn webview(device: &'d D) -> Self {
        Self::new(device, WEBVIEW_COMMAND_LINE)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current flags; a missing file is an empty list
    pub async fn read(&self) -> Result<Vec<String>> {
        Ok(self.snapshot().await?.flags)
    }

    /// Current file contents, kept byte-for-byte for a later `restore`
    pub async fn snapshot(&self) -> Result<FlagSnapshot> {
        let raw = self
            .device
            .read_file(&self.path)
            .await
            .map_err(|e| NetlogError::flag_store(FlagOp::Read, &self.path, e))?;

        let flags = match &raw {
            Some(bytes) => {
                if std::str::from_utf8(bytes).is_err() {
                    warn!("{} is not valid UTF-8; flags will be approximated", self.path);
                }
                format::parse(&String::from_utf8_lossy(bytes))
            }
            None => Vec::new(),
        };
        debug!("Read flags from {}: {:?}", self.path, flags);
        Ok(FlagSnapshot { raw, flags })
    }

    /// Put the file back exactly as `snapshot` found it
    pub async fn restore(&self, snapshot: &FlagSnapshot) -> Result<()> {
        match &snapshot.raw {
            None => {
                debug!("Removing {}", self.path);
                self.device
                    .remove_path(&self.path, false)
                    .await
                    .map_err(|e| NetlogError::flag_store(FlagOp::Remove, &self.path, e))?;
            }
            Some(bytes) => {
                debug!("Restoring {} bytes to {}", bytes.len(), self.path);
                self.device
                    .write_file(&self.path, bytes)
                    .await
                    .map_err(|e| NetlogError::flag_store(FlagOp::Write, &self.path, e))?;
            }
        }

        let current = self.snapshot().await?;
        if current.raw != snapshot.raw {
            return Err(NetlogError::FlagVerification {
                path: self.path.clone(),
                expected: snapshot.flags.clone(),
                actual: current.flags,
            });
        }
        Ok(())
    }

    /// Replace the stored flags without reading them back
    ///
    /// An empty list removes the file. On error the device was not changed
    /// as far as the transport can tell.
    pub async fn put(&self, flags: &[String]) -> Result<()> {
        if flags.is_empty() {
            debug!("Removing {}", self.path);
            self.device
                .remove_path(&self.path, false)
                .await
                .map_err(|e| NetlogError::flag_store(FlagOp::Remove, &self.path, e))
        } else {
            debug!("Writing flags to {}: {:?}", self.path, flags);
            let contents = format::serialize(flags);
            self.device
                .write_file(&self.path, contents.as_bytes())
                .await
                .map_err(|e| NetlogError::flag_store(FlagOp::Write, &self.path, e))
        }
    }

    /// Fail with `FlagVerification` unless the store holds exactly `flags`
    pub async fn verify(&self, flags: &[String]) -> Result<()> {
        let actual = self.read().await?;
        if actual != flags {
            return Err(NetlogError::FlagVerification {
                path: self.path.clone(),
                expected: flags.to_vec(),
                actual,
            });
        }
        Ok(())
    }
}
