use dropbot_core::{BbKey, Blackboard, Vec3};

const IN_TRANSPORT: BbKey<bool> = BbKey::new("Global.IsInTransport");
const PHASE: BbKey<i32> = BbKey::new("Global.Phase");
const DESTINATION: BbKey<Vec3> = BbKey::new("Jump.Destination");

#[test]
fn blackboard_set_get_remove_roundtrip() {
    let label = BbKey::<String>::new("Debug.Label");

    let mut bb = Blackboard::new();
    assert!(!bb.contains(PHASE));

    bb.set(PHASE, 3);
    bb.set(label, "landed".to_string());

    assert_eq!(bb.get(PHASE).copied(), Some(3));
    assert_eq!(bb.get(label).map(|s| s.as_str()), Some("landed"));

    assert_eq!(bb.remove(PHASE), Some(3));
    assert_eq!(bb.get(PHASE), None);
    assert_eq!(bb.len(), 1);
}

#[test]
fn is_set_compares_against_type_default() {
    let mut bb = Blackboard::new();
    assert!(!bb.is_set(DESTINATION));

    bb.set(DESTINATION, Vec3::ZERO);
    assert!(!bb.is_set(DESTINATION));

    bb.set(DESTINATION, Vec3::new(100.0, 0.0, 0.0));
    assert!(bb.is_set(DESTINATION));

    bb.set(IN_TRANSPORT, false);
    assert!(!bb.is_set(IN_TRANSPORT));
    bb.set(IN_TRANSPORT, true);
    assert!(bb.is_set(IN_TRANSPORT));
}

#[test]
fn missing_values_read_as_default() {
    let bb = Blackboard::new();
    assert_eq!(bb.value_or_default(PHASE), 0);
    assert_eq!(bb.value_or_default(DESTINATION), Vec3::ZERO);
}

#[test]
#[should_panic(expected = "blackboard type mismatch")]
fn blackboard_type_mismatch_panics() {
    let mut bb = Blackboard::new();
    bb.set(BbKey::<u32>::new("Shared.Slot"), 1u32);
    let _ = bb.get(BbKey::<i32>::new("Shared.Slot"));
}
