use super::*;

#[test]
fn test_table_validates() {
    assert_eq!(validate_table(), Ok(()));
}

#[test]
/// Every table slot holds the command carrying that id.
fn test_slots_match_ids() {
    for id in 0..COMMAND_COUNT as u8 {
        if let Some(command) = Command::from_id(id) {
            assert_eq!(command.id(), id);
        }
    }
    assert_eq!(Command::from_id(0x0C), Some(Command::SetInputPos));
    assert_eq!(Command::from_id(0x17), Some(Command::GetVbusVoltage));
}

#[test]
/// Unlisted ids resolve to nothing instead of failing.
fn test_unknown_ids() {
    for id in 0x1B..=0x1F {
        assert!(lookup(id).is_none());
    }
    assert!(lookup(0x40).is_none());
}

#[test]
/// Only query responses and the heartbeat accept subscriptions.
fn test_subscribable_set() {
    let subscribable: [u8; 9] = [0x01, 0x03, 0x04, 0x05, 0x09, 0x0A, 0x14, 0x15, 0x17];
    for id in 0..COMMAND_COUNT as u32 {
        assert_eq!(
            is_subscribable(id),
            subscribable.contains(&(id as u8)),
            "command {:#x}",
            id
        );
    }
    assert!(!is_subscribable(0x101));
}

#[test]
/// Actions and reserved ids carry no payload layout.
fn test_payloadless_kinds() {
    for desc in COMMAND_TABLE.iter().flatten() {
        match desc.kind {
            CommandKind::Action | CommandKind::Reserved => assert!(desc.layout.is_empty()),
            _ => assert!(!desc.layout.is_empty()),
        }
    }
}
