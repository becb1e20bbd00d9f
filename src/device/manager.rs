use crate::adb::AdbServer;
use crate::core::types::Device;
use crate::error::{NetlogError, Result};
use log::debug;

/// Device discovery and target selection
#[derive(Clone)]
pub struct DeviceManager {
    host: String,
    port: u16,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceManager {
    /// Create a new DeviceManager with default localhost:5037
    pub fn new() -> Self {
        Self::with_address("localhost", 5037)
    }

    pub fn with_address(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// List all devices the server knows about, in any state
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        debug!("DeviceManager::list_devices() - {}:{}", self.host, self.port);
        let raw = AdbServer::list_devices(&self.host, self.port).await?;
        Ok(super::device_info::parse_device_list(&raw))
    }

    /// Resolve exactly one target device
    pub async fn get_target_device(&self, requested: &[String]) -> Result<Device> {
        let devices = self.list_devices().await?;
        select_single_device(devices, requested)
    }
}

/// Pick the one eligible device
///
/// Eligible devices are those in `device` state, restricted to `requested`
/// serials when any are given. A requested serial that is not connected and
/// ready is an error, as is finding zero or more than one eligible device.
pub fn select_single_device(devices: Vec<Device>, requested: &[String]) -> Result<Device> {
    for serial in requested {
        let ready = devices
            .iter()
            .any(|d| d.is_available() && d.id.as_str() == serial);
        if !ready {
            return Err(NetlogError::DeviceNotFound(serial.clone()));
        }
    }

    let mut eligible: Vec<Device> = devices
        .into_iter()
        .filter(Device::is_available)
        .filter(|d| requested.is_empty() || requested.iter().any(|s| s == d.id.as_str()))
        .collect();

    match eligible.len() {
        0 => Err(NetlogError::NoDevicesFound),
        1 => Ok(eligible.remove(0)),
        _ => Err(NetlogError::MultipleDevicesFound(
            eligible.iter().map(|d| d.id.to_string()).collect(),
        )),
    }
}
