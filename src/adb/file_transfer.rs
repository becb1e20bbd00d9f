use crate::adb::connection::AdbConnection;
use crate::adb::protocol::{sync, SyncProtocol, SyncStat, SYNC_MAX_CHUNK};
use crate::core::types::DeviceId;
use crate::error::{NetlogError, Result};
use crate::progress::ProgressReporter;
use log::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// File transfer operations over one `sync:` session
pub struct FileTransfer {
    conn: AdbConnection,
    progress: Option<Box<dyn ProgressReporter>>,
}

impl FileTransfer {
    /// Open a sync session, optionally on a specific device
    pub async fn new(host: &str, port: u16, device_id: Option<&DeviceId>) -> Result<Self> {
        let mut conn = AdbConnection::connect(host, port).await?;

        if let Some(id) = device_id {
            conn.select_device(id)?;
        }

        conn.send_command("sync:")?;
        conn.read_okay()?;

        Ok(Self {
            conn,
            progress: None,
        })
    }

    pub fn set_progress_reporter(&mut self, progress: Box<dyn ProgressReporter>) {
        self.progress = Some(progress);
    }

    /// Stat a remote path
    pub fn stat(&mut self, remote_path: &str) -> Result<SyncStat> {
        self.conn
            .write_all(&SyncProtocol::request(sync::STAT, remote_path.as_bytes()))?;

        let mut response = [0u8; SyncStat::LEN];
        self.conn.read_exact(&mut response)?;
        SyncStat::from_bytes(&response)
    }

    /// Pull a remote file into a local file, returning the byte count
    pub fn pull(&mut self, remote_path: &str, local_path: &Path) -> Result<u64> {
        info!("Pulling {} to {}", remote_path, local_path.display());

        let stat = self.stat(remote_path)?;
        if !stat.exists() {
            return Err(NetlogError::FileTransfer(format!(
                "Remote file does not exist: {}",
                remote_path
            )));
        }
        if !stat.is_file() {
            return Err(NetlogError::FileTransfer(format!(
                "Can only pull regular files: {}",
                remote_path
            )));
        }

        if let Some(progress) = &self.progress {
            progress.start(stat.size() as u64);
        }

        let file = File::create(local_path).map_err(|e| {
            NetlogError::FileTransfer(format!("Cannot create {}: {}", local_path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        let received = self.receive(remote_path, &mut writer)?;
        writer
            .flush()
            .map_err(|e| NetlogError::FileTransfer(format!("Write error: {}", e)))?;

        if let Some(progress) = &self.progress {
            progress.finish();
        }

        info!("Successfully pulled {} ({} bytes)", remote_path, received);
        Ok(received)
    }

    /// Read a remote file into memory, or `None` if it does not exist
    pub fn read(&mut self, remote_path: &str) -> Result<Option<Vec<u8>>> {
        let stat = self.stat(remote_path)?;
        if !stat.exists() {
            debug!("{} does not exist", remote_path);
            return Ok(None);
        }

        let mut contents = Vec::with_capacity(stat.size() as usize);
        self.receive(remote_path, &mut contents)?;
        Ok(Some(contents))
    }

    /// Write `contents` to a remote file with the given permission bits
    pub fn write(&mut self, remote_path: &str, contents: &[u8], mode: u32) -> Result<()> {
        debug!("Writing {} bytes to {}", contents.len(), remote_path);

        self.conn
            .write_all(&SyncProtocol::send_request(remote_path, mode))?;

        for chunk in contents.chunks(SYNC_MAX_CHUNK) {
            self.conn.write_all(&SyncProtocol::data_packet(chunk)?)?;
        }

        let mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        self.conn.write_all(&SyncProtocol::done_packet(mtime))?;

        let (id, len) = self.read_header()?;
        match &id {
            sync::OKAY => Ok(()),
            sync::FAIL => {
                let message = self.read_payload(len)?;
                Err(NetlogError::FileTransfer(format!(
                    "Write to {} failed: {}",
                    remote_path,
                    String::from_utf8_lossy(&message)
                )))
            }
            _ => Err(NetlogError::FileTransfer(format!(
                "Unexpected response: {:?}",
                String::from_utf8_lossy(&id)
            ))),
        }
    }

    fn receive<W: Write>(&mut self, remote_path: &str, writer: &mut W) -> Result<u64> {
        self.conn
            .write_all(&SyncProtocol::request(sync::RECV, remote_path.as_bytes()))?;

        let mut received = 0u64;
        loop {
            let (id, len) = self.read_header()?;
            match &id {
                sync::DATA => {
                    let data = self.read_payload(len)?;
                    writer
                        .write_all(&data)
                        .map_err(|e| NetlogError::FileTransfer(format!("Write error: {}", e)))?;
                    received += data.len() as u64;

                    if let Some(progress) = &self.progress {
                        progress.update(received);
                    }
                }
                sync::DONE => break,
                sync::FAIL => {
                    let message = self.read_payload(len)?;
                    return Err(NetlogError::FileTransfer(format!(
                        "Pull of {} failed: {}",
                        remote_path,
                        String::from_utf8_lossy(&message)
                    )));
                }
                _ => {
                    return Err(NetlogError::FileTransfer(format!(
                        "Unexpected response: {:?}",
                        String::from_utf8_lossy(&id)
                    )));
                }
            }
        }

        Ok(received)
    }

    fn read_header(&mut self) -> Result<([u8; 4], u32)> {
        let mut header = [0u8; 8];
        self.conn.read_exact(&mut header)?;
        Ok(SyncProtocol::parse_header(&header))
    }

    fn read_payload(&mut self, len: u32) -> Result<Vec<u8>> {
        let len = len as usize;
        if len > SYNC_MAX_CHUNK {
            return Err(NetlogError::AdbProtocol(format!(
                "Sync packet of {} bytes exceeds limit",
                len
            )));
        }
        let mut data = vec![0u8; len];
        if len > 0 {
            self.conn.read_exact(&mut data)?;
        }
        Ok(data)
    }
}

impl Drop for FileTransfer {
    fn drop(&mut self) {
        let _ = self.conn.write_all(&SyncProtocol::request(sync::QUIT, &[]));
    }
}
