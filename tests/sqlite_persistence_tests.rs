#![cfg(feature = "sqlite")]

use farm_manager::{
    Inventory, InventoryStore, Machinery, PersistenceError, Personnel, ResourceStatus,
    SqliteInventoryStore,
};
use tempfile::NamedTempFile;

#[test]
fn sqlite_store_round_trip_inventory() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteInventoryStore::new(file.path()).unwrap();
    assert!(store.load_inventory().expect("load empty").is_none());

    let mut inventory = Inventory::new();
    inventory
        .register_machinery(Machinery::with_id("m1", "Tractor 1", "Tractor").purchased_on("2022-02-01"))
        .unwrap();
    inventory
        .register_machinery(Machinery::with_id("m2", "Seeder", "Seeder"))
        .unwrap();
    let mut person = Personnel::new("Ben", "Mechanic", "Workshop");
    person.id = "p1".into();
    inventory.register_personnel(person).unwrap();
    inventory.assign_machinery("m1", "Plowing", Some("North")).unwrap();
    inventory.record_maintenance("m2").unwrap();

    store.save_inventory(&inventory).expect("save inventory");

    let loaded = store
        .load_inventory()
        .expect("load inventory")
        .expect("inventory exists");

    assert_eq!(loaded.resources(), inventory.resources());
    assert_eq!(loaded.usage_log(), inventory.usage_log());
    assert_eq!(
        loaded.get_machinery("m1").unwrap().status,
        ResourceStatus::InUse
    );
    let ids: Vec<&str> = loaded.resources().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["m1", "m2", "p1"]);
}

#[test]
fn sqlite_store_replaces_previous_save() {
    let store = SqliteInventoryStore::in_memory().unwrap();

    let mut first = Inventory::new();
    first
        .register_machinery(Machinery::with_id("a", "Old", "Tractor"))
        .unwrap();
    first
        .register_machinery(Machinery::with_id("b", "Older", "Tractor"))
        .unwrap();
    store.save_inventory(&first).unwrap();

    let mut second = Inventory::new();
    second
        .register_machinery(Machinery::with_id("c", "New", "Harvester"))
        .unwrap();
    store.save_inventory(&second).unwrap();

    let loaded = store.load_inventory().unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.get_machinery("a").is_none());
    assert_eq!(loaded.usage_log().len(), 1);
}

#[test]
fn sqlite_store_keeps_interleaved_order() {
    let store = SqliteInventoryStore::in_memory().unwrap();
    let mut inventory = Inventory::new();
    inventory
        .register_machinery(Machinery::with_id("m1", "Tractor 1", "Tractor"))
        .unwrap();
    let mut person = Personnel::new("Ana", "Operator", "Field");
    person.id = "p1".into();
    inventory.register_personnel(person).unwrap();
    inventory
        .register_machinery(Machinery::with_id("m2", "Seeder", "Seeder"))
        .unwrap();
    store.save_inventory(&inventory).unwrap();

    let loaded = store.load_inventory().unwrap().unwrap();
    let ids: Vec<&str> = loaded.resources().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["m1", "p1", "m2"]);
}

#[test]
fn sqlite_store_rejects_machinery_marked_assigned() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteInventoryStore::new(file.path()).unwrap();

    let connection = rusqlite::Connection::open(file.path()).unwrap();
    connection
        .execute(
            "INSERT INTO machinery (position, id, machinery_json) VALUES (0, 'm1', ?1)",
            [r#"{"id":"m1","name":"Tractor 1","type":"Tractor","status":"assigned"}"#],
        )
        .unwrap();
    drop(connection);

    assert!(matches!(
        store.load_inventory(),
        Err(PersistenceError::InvalidData(_))
    ));
}
