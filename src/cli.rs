use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Record a WebView netlog from an Android app.
///
/// Sets the --log-net-log flag for the app's WebView, waits for ctrl-C while
/// the app is exercised, restores the original flags, and pulls the netlog.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Package name of the app to record (e.g. com.example.app)
    #[arg(long)]
    pub package: String,

    /// Record even if the app is already running
    #[arg(long)]
    pub force: bool,

    /// Serial or configured alias of the device to use (repeatable)
    #[arg(long = "device", short = 'd')]
    pub devices: Vec<String>,

    /// Where to write the netlog [default: netlog.json]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// ADB server hostname [default: localhost]
    #[arg(long, env = "ADB_SERVER_HOST")]
    pub host: Option<String>,

    /// ADB server port [default: 5037]
    #[arg(long, short = 'p', env = "ADB_SERVER_PORT")]
    pub port: Option<u16>,

    /// adb binary used to start the server if it is not running
    #[arg(long, env = "ADB_PATH")]
    pub adb_path: Option<PathBuf>,
}

impl Cli {
    /// Server address, falling back to the config file
    pub fn address(&self, config: &Config) -> (String, u16) {
        let host = self.host.clone().unwrap_or_else(|| config.host());
        let port = self.port.unwrap_or_else(|| config.port());
        (host, port)
    }

    pub fn output_path(&self, config: &Config) -> PathBuf {
        self.output.clone().unwrap_or_else(|| config.output_path())
    }

    /// Requested serials with config aliases resolved
    pub fn device_serials(&self, config: &Config) -> Vec<String> {
        self.devices
            .iter()
            .map(|d| config.resolve_device(d))
            .collect()
    }
}
