//! Tests for target device selection

#[cfg(test)]
mod tests {
    use crate::device::manager::select_single_device;
    use crate::device::DeviceManager;
    use crate::error::NetlogError;
    use crate::testing::fixtures::{scenarios, test_device};

    #[test]
    fn test_device_manager_with_address() {
        let manager = DeviceManager::with_address("192.168.1.100", 5555);
        assert_eq!(manager.host(), "192.168.1.100");
        assert_eq!(manager.port(), 5555);

        let manager = DeviceManager::default();
        assert_eq!(manager.host(), "localhost");
        assert_eq!(manager.port(), 5037);
    }

    #[test]
    fn test_single_device_selected_without_request() {
        let device = select_single_device(scenarios::single_device(), &[]).unwrap();
        assert_eq!(device.id.as_str(), "abc123");
    }

    #[test]
    fn test_two_devices_without_request_is_ambiguous() {
        let devices = vec![test_device("emulator-5554"), test_device("1A2B3C4D")];
        let err = select_single_device(devices, &[]).unwrap_err();
        match err {
            NetlogError::MultipleDevicesFound(serials) => {
                assert_eq!(serials, vec!["emulator-5554", "1A2B3C4D"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_narrows_to_one() {
        let requested = vec!["abc123def456".to_string()];
        let device = select_single_device(scenarios::multiple_devices(), &requested).unwrap();
        assert_eq!(device.id.as_str(), "abc123def456");
    }

    #[test]
    fn test_requesting_two_devices_is_ambiguous() {
        let requested = vec!["emulator-5554".to_string(), "abc123def456".to_string()];
        let err = select_single_device(scenarios::multiple_devices(), &requested).unwrap_err();
        assert!(matches!(err, NetlogError::MultipleDevicesFound(_)));
    }

    #[test]
    fn test_unknown_request_is_not_found() {
        let requested = vec!["nope".to_string()];
        let err = select_single_device(scenarios::multiple_devices(), &requested).unwrap_err();
        assert!(matches!(err, NetlogError::DeviceNotFound(ref s) if s == "nope"));
    }

    #[test]
    fn test_no_devices() {
        let err = select_single_device(scenarios::no_devices(), &[]).unwrap_err();
        assert!(matches!(err, NetlogError::NoDevicesFound));
    }

    #[test]
    fn test_unready_devices_are_not_eligible() {
        let devices = vec![
            scenarios::unauthorized_device(),
            scenarios::offline_device(),
            test_device("ready1"),
        ];
        let device = select_single_device(devices, &[]).unwrap();
        assert_eq!(device.id.as_str(), "ready1");
    }

    #[test]
    fn test_requesting_offline_device_is_not_found() {
        let requested = vec!["offline123".to_string()];
        let devices = vec![scenarios::offline_device(), test_device("ready1")];
        let err = select_single_device(devices, &requested).unwrap_err();
        assert!(matches!(err, NetlogError::DeviceNotFound(_)));
    }
}
