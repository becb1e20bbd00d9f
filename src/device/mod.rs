pub mod device_info;
pub mod manager;
pub mod ops;
pub mod process;

pub use manager::DeviceManager;
pub use ops::{AdbDevice, DeviceOps};
pub use process::ProcessInfo;


#[cfg(test)]
mod manager_test;
