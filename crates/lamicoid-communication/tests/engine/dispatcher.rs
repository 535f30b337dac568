use lamicoid_communication::NetworkDispatcher;
use lamicoid_core::{DeviceModel, DispatchError};

use crate::common::{MockEngine, Script};

#[test]
fn test_send_delivers_whole_payload() {
    let engine = MockEngine::new(Script::default());
    let dispatcher = NetworkDispatcher::new(&engine);

    assert!(dispatcher.send(DeviceModel::Fusion32, b"PRN-DATA", " 192.168.1.40 "));

    let sends = engine.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].0, DeviceModel::Fusion32);
    assert_eq!(sends[0].1, b"PRN-DATA");
    assert_eq!(sends[0].2, "192.168.1.40");
}

#[test]
fn test_ipv6_address_accepted() {
    let engine = MockEngine::new(Script::default());
    let dispatcher = NetworkDispatcher::new(&engine);
    assert!(dispatcher
        .try_send(DeviceModel::Edge12, b"x", "fe80::1")
        .is_ok());
}

#[test]
fn test_invalid_address_never_reaches_engine() {
    let engine = MockEngine::new(Script::default());
    let dispatcher = NetworkDispatcher::new(&engine);

    for address in ["", "laser.local", "192.168.1", "300.1.1.1", "10.0.0.1\0"] {
        assert_eq!(
            dispatcher.try_send(DeviceModel::Pro24, b"x", address),
            Err(DispatchError::InvalidAddress {
                address: address.to_string()
            })
        );
        assert!(!dispatcher.send(DeviceModel::Pro24, b"x", address));
    }
    assert!(engine.sends().is_empty());
}

#[test]
fn test_empty_payload_refused() {
    let engine = MockEngine::new(Script::default());
    let dispatcher = NetworkDispatcher::new(&engine);
    assert_eq!(
        dispatcher.try_send(DeviceModel::Pro24, b"", "10.0.0.5"),
        Err(DispatchError::EmptyPayload)
    );
    assert!(engine.sends().is_empty());
}

#[test]
fn test_failed_transfer_is_not_retried() {
    let engine = MockEngine::new(Script {
        send_succeeds: false,
        ..Script::default()
    });
    let dispatcher = NetworkDispatcher::new(&engine);

    assert_eq!(
        dispatcher.try_send(DeviceModel::Zing24, b"PRN", "10.0.0.5"),
        Err(DispatchError::TransferFailed {
            model: "Zing24".to_string(),
            address: "10.0.0.5".to_string()
        })
    );
    assert_eq!(engine.sends().len(), 1);

    assert!(!dispatcher.send(DeviceModel::Zing24, b"PRN", "10.0.0.5"));
    assert_eq!(engine.sends().len(), 2);
}
