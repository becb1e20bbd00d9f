//! Netlog capture: install the logging flag, wait for ctrl-C, restore the
//! original flags, then fetch the log off the device.

pub mod artifact;
pub mod state;

pub use artifact::{ArtifactPaths, DEFAULT_LOCAL_PATH};
pub use state::{CaptureState, StateTracker};

use crate::device::DeviceOps;
use crate::error::{CaptureStep, NetlogError, Result};
use crate::flags::{with_flags, FlagStore};
use crate::progress::ProgressFactory;
use colored::*;
use log::*;
use std::future::Future;
use std::path::PathBuf;


/// What to capture and where to put it
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub package: String,
    /// Proceed even if the app is already running
    pub force: bool,
    pub output: PathBuf,
}

impl CaptureOptions {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            force: false,
            output: PathBuf::from(DEFAULT_LOCAL_PATH),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

/// Summary of a finished capture
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub artifact: ArtifactPaths,
    /// Flags the app saw while recording
    pub flags: Vec<String>,
    pub bytes: u64,
    pub warnings: Vec<String>,
}

/// Drives one capture on one device
pub struct Capture<'d, D: DeviceOps + ?Sized> {
    device: &'d D,
    options: CaptureOptions,
    progress: ProgressFactory,
    tracker: StateTracker,
    warnings: Vec<String>,
}

impl<'d, D: DeviceOps + ?Sized> Capture<'d, D> {
    pub fn new(device: &'d D, options: CaptureOptions) -> Self {
        Self {
            device,
            options,
            progress: ProgressFactory::disabled(),
            tracker: StateTracker::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressFactory) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.tracker.current()
    }

    pub fn history(&self) -> &[CaptureState] {
        self.tracker.history()
    }

    /// Run the capture, recording until `stop` resolves
    pub async fn run<S>(&mut self, stop: S) -> Result<CaptureReport>
    where
        S: Future<Output = ()>,
    {
        let result = self.run_steps(stop).await;
        match &result {
            Ok(_) => self.tracker.advance(CaptureState::Done),
            Err(e) => {
                debug!("Capture failed in state {}: {}", self.tracker.current(), e);
                self.tracker.fail();
            }
        }
        result
    }

    async fn run_steps<S>(&mut self, stop: S) -> Result<CaptureReport>
    where
        S: Future<Output = ()>,
    {
        let device = self.device;
        let package = self.options.package.clone();
        info!("Recording netlog for {} on {}", package, device.serial());

        self.check_not_running(&package).await?;
        self.tracker.advance(CaptureState::PreconditionChecked);

        let artifact = ArtifactPaths::resolve(device, &package, &self.options.output)
            .await
            .map_err(|e| e.at(CaptureStep::StartSession))?;
        let capture_flag = artifact.capture_flag();

        let store = FlagStore::webview(device);
        let tracker = &mut self.tracker;
        let scoped = with_flags(
            &store,
            |current| {
                // Keep whatever the operator already had enabled.
                let mut flags = current.to_vec();
                flags.push(capture_flag);
                flags
            },
            move || async move {
                tracker.advance(CaptureState::SessionActive);
                println!(
                    "Netlog will start recording as soon as app starts up. Press {} to stop recording.",
                    "ctrl-C".bright_cyan()
                );
                tracker.advance(CaptureState::WaitingForSignal);
                stop.await;
                println!();
                Ok(())
            },
        )
        .await
        .map_err(|e| e.at(CaptureStep::StartSession))?;

        self.tracker.advance(CaptureState::SessionClosed);
        scoped.value.map_err(|e| e.at(CaptureStep::WaitForSignal))?;

        let restore_error = scoped.restore.err();
        match &restore_error {
            Some(e) => error!("Failed to restore original flags: {}", e),
            None => info!("Original flags restored"),
        }

        // Retrieval runs even if the restore failed; the restore error wins.
        let retrieved = self.retrieve(&artifact).await;
        match (restore_error, retrieved) {
            (None, Ok(bytes)) => Ok(CaptureReport {
                artifact,
                flags: scoped.applied,
                bytes,
                warnings: self.warnings.clone(),
            }),
            (None, Err(e)) => Err(e),
            (Some(restore), Ok(_)) => Err(restore.at(CaptureStep::RestoreFlags)),
            (Some(restore), Err(e)) => {
                error!("{}", e);
                Err(restore.at(CaptureStep::RestoreFlags))
            }
        }
    }

    async fn check_not_running(&mut self, package: &str) -> Result<()> {
        let processes = self
            .device
            .list_processes(package)
            .await
            .map_err(|e| e.at(CaptureStep::CheckPrecondition))?;

        if processes.is_empty() {
            return Ok(());
        }

        debug!(
            "Running processes for {}: {:?}",
            package,
            processes.iter().map(|p| p.pid).collect::<Vec<_>>()
        );
        if !self.options.force {
            return Err(NetlogError::ApplicationAlreadyRunning(package.to_string()));
        }

        let message = format!(
            "Netlog requires setting commandline flags, which only works if the application \
             ({}) is not already running. Please kill the app and restart the script.",
            package
        );
        warn!("{}", message);
        self.warnings.push(message);
        Ok(())
    }

    /// Copy the netlog to the host and delete it from the device
    async fn retrieve(&mut self, artifact: &ArtifactPaths) -> Result<u64> {
        println!(
            "Pulling netlog to {}",
            format!("\"{}\"", artifact.local.display()).bright_cyan()
        );

        // The netlog is owned by the app's uid, which the shell user cannot read.
        let progress = self.progress.file_transfer(artifact::NETLOG_FILE_NAME);
        let bytes = self
            .device
            .pull_file(&artifact.remote, &artifact.local, true, progress)
            .await
            .map_err(|e| e.at(CaptureStep::PullArtifact))?;

        self.device
            .remove_path(&artifact.remote, true)
            .await
            .map_err(|e| e.at(CaptureStep::RemoveArtifact))?;

        self.tracker.advance(CaptureState::ArtifactRetrieved);
        Ok(bytes)
    }
}
