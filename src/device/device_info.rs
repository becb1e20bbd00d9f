use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::core::types::{Device, DeviceState};

static RE_DEVICE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)(.*)$").unwrap());
static RE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+):(\S*)").unwrap());

/// Parse the payload of `host:devices-l`
///
/// Each line is `<serial> <state>` followed by optional `key:value` pairs
/// such as `usb:1-1 product:oriole model:Pixel_6 device:oriole transport_id:3`.
pub fn parse_device_list(raw: &str) -> Vec<Device> {
    let devices: Vec<Device> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of devices"))
        .filter_map(parse_device_line)
        .collect();

    debug!("Parsed {} devices", devices.len());
    devices
}

fn parse_device_line(line: &str) -> Option<Device> {
    let captures = RE_DEVICE_LINE.captures(line)?;
    let mut device = Device::new(&captures[1]).with_state(DeviceState::parse(&captures[2]));

    for attr in RE_ATTRIBUTE.captures_iter(&captures[3]) {
        let value = &attr[2];
        match &attr[1] {
            "model" => device = device.with_model(value),
            "product" => device = device.with_product(value),
            "device" => device = device.with_device(value),
            "transport_id" => {
                if let Ok(id) = value.parse() {
                    device = device.with_transport_id(id);
                }
            }
            _ => {}
        }
    }

    Some(device)
}
