use std::fmt;
use thiserror::Error;

/// Steps of a capture, used to say where a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    CheckPrecondition,
    StartSession,
    WaitForSignal,
    RestoreFlags,
    PullArtifact,
    RemoveArtifact,
}

impl fmt::Display for CaptureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureStep::CheckPrecondition => "checking whether the app is running",
            CaptureStep::StartSession => "installing netlog flags",
            CaptureStep::WaitForSignal => "waiting for ctrl-C",
            CaptureStep::RestoreFlags => "restoring original flags",
            CaptureStep::PullArtifact => "pulling netlog from device",
            CaptureStep::RemoveArtifact => "removing netlog from device",
        };
        f.write_str(name)
    }
}

/// Flag store operations, named in store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOp {
    Read,
    Write,
    Remove,
}

impl fmt::Display for FlagOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagOp::Read => f.write_str("read"),
            FlagOp::Write => f.write_str("write"),
            FlagOp::Remove => f.write_str("remove"),
        }
    }
}

#[derive(Error, Debug)]
pub enum NetlogError {
    #[error("No devices found")]
    NoDevicesFound,

    #[error("No device found matching ID: {0}")]
    DeviceNotFound(String),

    #[error("Multiple devices found ({}); select one with --device", .0.join(", "))]
    MultipleDevicesFound(Vec<String>),

    #[error(
        "Netlog requires setting commandline flags, which only works if the application \
         ({0}) is not already running. Please kill the app and restart the script, \
         or pass --force to ignore this check."
    )]
    ApplicationAlreadyRunning(String),

    #[error("Package not found on device: {0}")]
    PackageNotFound(String),

    #[error("Failed to {op} flag file {path}: {source}")]
    FlagStore {
        op: FlagOp,
        path: String,
        #[source]
        source: Box<NetlogError>,
    },

    #[error("Flag file {path} did not persist: wrote {expected:?}, read back {actual:?}")]
    FlagVerification {
        path: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Flag session misuse: {0}")]
    Session(&'static str),

    #[error("Capture failed while {step}: {source}")]
    Capture {
        step: CaptureStep,
        #[source]
        source: Box<NetlogError>,
    },

    #[error("ADB connection error: {0}")]
    AdbConnection(#[from] std::io::Error),

    #[error("ADB protocol error: {0}")]
    AdbProtocol(String),

    #[error("ADB server error: {0}")]
    Server(String),

    #[error("File transfer error: {0}")]
    FileTransfer(String),

    #[error("Shell command failed: {0}")]
    Shell(String),

    #[error("Invalid UTF-8 in response: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NetlogError {
    /// Wrap an error with the capture step it happened in
    pub fn at(self, step: CaptureStep) -> Self {
        NetlogError::Capture {
            step,
            source: Box::new(self),
        }
    }

    pub fn flag_store(op: FlagOp, path: impl Into<String>, source: NetlogError) -> Self {
        NetlogError::FlagStore {
            op,
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetlogError>;
