use crate::core::types::DeviceId;
use crate::device::{DeviceOps, ProcessInfo};
use crate::error::{NetlogError, Result};
use crate::flags::{format, store::COMMAND_LINE_DIR, WEBVIEW_COMMAND_LINE};
use crate::progress::ProgressReporter;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Every operation the mock saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListProcesses(String),
    DataDir(String),
    Read(String),
    Write(String),
    Remove { path: String, as_root: bool },
    Pull { remote: String, local: PathBuf, as_root: bool },
}

/// In-memory device for testing
pub struct MockDevice {
    serial: DeviceId,
    files: Mutex<HashMap<String, Vec<u8>>>,
    processes: Vec<ProcessInfo>,
    data_dirs: HashMap<String, String>,
    failing_store_writes: HashSet<usize>,
    store_writes: Mutex<usize>,
    garble_writes: bool,
    fail_pull: bool,
    fail_root_remove: bool,
    calls: Mutex<Vec<MockCall>>,
}

impl MockDevice {
    pub fn new(serial: &str) -> Self {
        Self {
            serial: DeviceId::new(serial),
            files: Mutex::new(HashMap::new()),
            processes: Vec::new(),
            data_dirs: HashMap::new(),
            failing_store_writes: HashSet::new(),
            store_writes: Mutex::new(0),
            garble_writes: false,
            fail_pull: false,
            fail_root_remove: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
        self
    }

    /// Seed the WebView command-line file
    pub fn with_flags(self, flags: &[&str]) -> Self {
        let flags: Vec<String> = flags.iter().map(|s| s.to_string()).collect();
        let path = webview_flag_path();
        self.with_file(&path, format::serialize(&flags).as_bytes())
    }

    pub fn with_process(mut self, pid: u32, name: &str) -> Self {
        self.processes.push(ProcessInfo {
            pid,
            name: name.to_string(),
        });
        self
    }

    pub fn with_data_dir(mut self, package: &str, dir: &str) -> Self {
        self.data_dirs.insert(package.to_string(), dir.to_string());
        self
    }

    /// Fail the nth (1-based) write or non-root remove
    pub fn failing_store_write(mut self, nth: usize) -> Self {
        self.failing_store_writes.insert(nth);
        self
    }

    /// Store something other than what was written
    pub fn garbling_writes(mut self) -> Self {
        self.garble_writes = true;
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn failing_root_remove(mut self) -> Self {
        self.fail_root_remove = true;
        self
    }

    /// Create a file as the app would, after construction
    pub fn put_file(&self, path: &str, contents: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Parsed WebView flags, `None` if the file does not exist
    pub fn flags(&self) -> Option<Vec<String>> {
        self.file(&webview_flag_path())
            .map(|bytes| format::parse(&String::from_utf8_lossy(&bytes)))
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of writes and non-root removes attempted
    pub fn store_writes(&self) -> usize {
        *self.store_writes.lock().unwrap()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_store_write(&self) -> Result<()> {
        let mut count = self.store_writes.lock().unwrap();
        *count += 1;
        if self.failing_store_writes.contains(&*count) {
            return Err(NetlogError::FileTransfer(format!(
                "mock write {} failed",
                *count
            )));
        }
        Ok(())
    }
}

pub fn webview_flag_path() -> String {
    format!("{}/{}", COMMAND_LINE_DIR, WEBVIEW_COMMAND_LINE)
}

#[async_trait]
impl DeviceOps for MockDevice {
    fn serial(&self) -> &DeviceId {
        &self.serial
    }

    async fn list_processes(&self, name: &str) -> Result<Vec<ProcessInfo>> {
        self.record(MockCall::ListProcesses(name.to_string()));
        Ok(self
            .processes
            .iter()
            .filter(|p| p.name.contains(name))
            .cloned()
            .collect())
    }

    async fn application_data_dir(&self, package: &str) -> Result<String> {
        self.record(MockCall::DataDir(package.to_string()));
        self.data_dirs
            .get(package)
            .cloned()
            .ok_or_else(|| NetlogError::PackageNotFound(package.to_string()))
    }

    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.record(MockCall::Read(path.to_string()));
        Ok(self.file(path))
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.record(MockCall::Write(path.to_string()));
        self.next_store_write()?;

        let stored = if self.garble_writes {
            b"_ --garbled\n".to_vec()
        } else {
            contents.to_vec()
        };
        self.files.lock().unwrap().insert(path.to_string(), stored);
        Ok(())
    }

    async fn remove_path(&self, path: &str, as_root: bool) -> Result<()> {
        self.record(MockCall::Remove {
            path: path.to_string(),
            as_root,
        });
        if as_root {
            if self.fail_root_remove {
                return Err(NetlogError::Shell("rm: Permission denied".to_string()));
            }
        } else {
            self.next_store_write()?;
        }
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    async fn pull_file(
        &self,
        remote: &str,
        local: &Path,
        as_root: bool,
        progress: Box<dyn ProgressReporter>,
    ) -> Result<u64> {
        self.record(MockCall::Pull {
            remote: remote.to_string(),
            local: local.to_path_buf(),
            as_root,
        });
        if self.fail_pull {
            return Err(NetlogError::Shell("cp: Permission denied".to_string()));
        }

        let contents = self.file(remote).ok_or_else(|| {
            NetlogError::FileTransfer(format!("Remote file does not exist: {}", remote))
        })?;
        progress.start(contents.len() as u64);
        std::fs::write(local, &contents)?;
        progress.finish();
        Ok(contents.len() as u64)
    }
}
