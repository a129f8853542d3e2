use groupform_core::db::{open_db, open_db_in_memory};
use groupform_core::{
    validate_group_submission, GroupForm, Member, RecordKind, RegistrationStore,
    SqliteRegistrationStore, StoreError, ValidGroup, ValidSoloEntry,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

fn valid_group(members: &[(&str, &str)], locked: bool) -> ValidGroup {
    let form = GroupForm::from_members(members.iter().copied(), locked);
    validate_group_submission(&form, &[], &[]).unwrap()
}

fn valid_solo(roll: &str, name: &str) -> ValidSoloEntry {
    ValidSoloEntry {
        roll: roll.to_string(),
        name: name.to_string(),
    }
}

#[test]
fn create_and_read_group_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::try_new(&conn).unwrap();

    let group = valid_group(&[("A100", "Alice"), ("A101", "Bob"), ("A102", "Cy")], true);
    let id = store.create_group(&group, Some("participant-1")).unwrap();

    let groups = store.read_all_groups().unwrap();
    assert_eq!(groups.len(), 1);
    let loaded = &groups[0];
    assert_eq!(loaded.id, id);
    assert!(loaded.locked);
    assert_eq!(loaded.present_count(), 3);
    assert_eq!(loaded.members[0], Member::new("A100", "Alice"));
    assert_eq!(loaded.members[3], Member::default());
    assert_eq!(loaded.creator_id.as_deref(), Some("participant-1"));
    assert!(loaded.created_at > 0);
}

#[test]
fn records_are_listed_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::try_new(&conn).unwrap();

    let first = store
        .create_group(&valid_group(&[("A100", "a"), ("A101", "b")], false), None)
        .unwrap();
    let second = store
        .create_group(&valid_group(&[("B100", "c"), ("B101", "d")], false), None)
        .unwrap();
    store.create_solo(&valid_solo("C100", "e"), None).unwrap();
    store.create_solo(&valid_solo("C101", "f"), None).unwrap();

    let ids: Vec<_> = store.read_all_groups().unwrap().iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![first, second]);

    let rolls: Vec<_> = store
        .read_all_solo()
        .unwrap()
        .into_iter()
        .map(|entry| entry.roll)
        .collect();
    assert_eq!(rolls, vec!["C100".to_string(), "C101".to_string()]);
}

#[test]
fn created_at_has_millisecond_resolution() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::try_new(&conn).unwrap();

    let before = epoch_millis();
    for roll in ["D100", "D101", "D102"] {
        store.create_solo(&valid_solo(roll, "x"), None).unwrap();
        std::thread::sleep(Duration::from_millis(3));
    }
    let after = epoch_millis();

    let stamps: Vec<i64> = store
        .read_all_solo()
        .unwrap()
        .iter()
        .map(|entry| entry.created_at)
        .collect();
    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]), "{stamps:?}");
    assert!(stamps
        .iter()
        .all(|stamp| (before - 1..=after + 1).contains(stamp)));
}

fn epoch_millis() -> i64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    i64::try_from(elapsed.as_millis()).unwrap()
}

#[test]
fn delete_releases_claimed_rolls() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::try_new(&conn).unwrap();

    let group_id = store
        .create_group(&valid_group(&[("A100", "a"), ("A101", "b")], false), None)
        .unwrap();
    let err = store.create_solo(&valid_solo("A100", "x"), None).unwrap_err();
    assert!(matches!(err, StoreError::RollConflict(ref roll) if roll == "A100"));

    store.delete_record(RecordKind::Group, group_id).unwrap();
    assert!(store.read_all_groups().unwrap().is_empty());
    store.create_solo(&valid_solo("A100", "x"), None).unwrap();
}

#[test]
fn delete_missing_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = store.delete_record(RecordKind::Solo, missing).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { kind: RecordKind::Solo, id } if id == missing
    ));
}

#[test]
fn delete_uses_record_kind_to_pick_collection() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::try_new(&conn).unwrap();

    let solo_id = store.create_solo(&valid_solo("D100", "d"), None).unwrap();
    let err = store.delete_record(RecordKind::Group, solo_id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(store.read_all_solo().unwrap().len(), 1);
}

#[test]
fn writers_with_stale_snapshots_cannot_both_claim_a_roll() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let store_a = SqliteRegistrationStore::try_new(&conn_a).unwrap();
    let store_b = SqliteRegistrationStore::try_new(&conn_b).unwrap();

    // Both clients validate against the same empty snapshot.
    let group = valid_group(&[("A100", "a"), ("A101", "b")], false);
    let solo = valid_solo("A101", "late");

    store_a.create_group(&group, Some("client-a")).unwrap();
    let err = store_b.create_solo(&solo, Some("client-b")).unwrap_err();
    assert!(matches!(err, StoreError::RollConflict(ref roll) if roll == "A101"));
    assert!(store_b.read_all_solo().unwrap().is_empty());
}
