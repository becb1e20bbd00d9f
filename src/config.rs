use crate::capture::DEFAULT_LOCAL_PATH;
use log::{debug, error};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".netlogconfig";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5037;

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub adb: AdbConfig,
    #[serde(default)]
    pub netlog: NetlogConfig,
    /// Device alias -> serial
    #[serde(default)]
    pub devices: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct AdbConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct NetlogConfig {
    pub output: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No home directory, using default config");
                Self::default()
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Self {
        debug!("Loading config from: {:?}", path);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                debug!("No config file found or unable to read it");
                return Self::default();
            }
        };

        match toml::from_str(&content) {
            Ok(config) => {
                debug!("Parsed config: {:?}", config);
                config
            }
            Err(e) => {
                error!("Error parsing config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Map a device alias to its serial; anything else passes through
    pub fn resolve_device(&self, name: &str) -> String {
        self.devices
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn host(&self) -> String {
        self.adb
            .host
            .clone()
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn port(&self) -> u16 {
        self.adb.port.unwrap_or(DEFAULT_PORT)
    }

    /// Configured netlog destination with `~` expanded
    pub fn output_path(&self) -> PathBuf {
        match &self.netlog.output {
            Some(output) => PathBuf::from(shellexpand::tilde(output).into_owned()),
            None => PathBuf::from(DEFAULT_LOCAL_PATH),
        }
    }
}
