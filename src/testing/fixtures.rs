use crate::core::types::{Device, DeviceId, DeviceState};
use crate::testing::mocks::MockDevice;

pub const TEST_PACKAGE: &str = "com.example.app";
pub const TEST_DATA_DIR: &str = "/data/data/com.example.app";
pub const TEST_NETLOG_PATH: &str = "/data/data/com.example.app/app_webview/netlog.json";

/// Create a test device with minimal information
pub fn test_device(id: &str) -> Device {
    Device::new(DeviceId::new(id))
        .with_state(DeviceState::Device)
        .with_model("TestModel")
        .with_product("TestProduct")
}

/// Create a test device with full information
pub fn test_device_full(id: &str, model: &str, brand: &str) -> Device {
    Device::new(DeviceId::new(id))
        .with_state(DeviceState::Device)
        .with_model(model)
        .with_product(format!("{}_product", brand.to_lowercase()))
        .with_device(format!("{}_device", model.to_lowercase()))
        .with_transport_id(1)
}

/// Create a collection of test devices
pub fn test_devices() -> Vec<Device> {
    vec![
        test_device_full("emulator-5554", "Emulator", "Google"),
        test_device_full("abc123def456", "Pixel 6", "Google"),
        test_device_full("192.168.1.100:5555", "Galaxy S21", "Samsung"),
    ]
}

/// A device with the example app installed but not running
pub fn netlog_device() -> MockDevice {
    MockDevice::new("emulator-5554").with_data_dir(TEST_PACKAGE, TEST_DATA_DIR)
}

/// Netlog content the app would have written
pub fn netlog_content() -> Vec<u8> {
    br#"{"constants":{},"events":[]}"#.to_vec()
}

/// Test data for different scenarios
pub mod scenarios {
    use super::*;

    /// No devices connected
    pub fn no_devices() -> Vec<Device> {
        vec![]
    }

    /// Single device connected
    pub fn single_device() -> Vec<Device> {
        vec![test_device("abc123")]
    }

    /// Multiple devices connected
    pub fn multiple_devices() -> Vec<Device> {
        test_devices()
    }

    /// Unauthorized device
    pub fn unauthorized_device() -> Device {
        Device::new(DeviceId::new("unauth123")).with_state(DeviceState::Unauthorized)
    }

    /// Offline device
    pub fn offline_device() -> Device {
        Device::new(DeviceId::new("offline123")).with_state(DeviceState::Offline)
    }
}
