pub mod types;

pub use types::{Device, DeviceId, DeviceState};
