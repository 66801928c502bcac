use farm_manager::{
    Inventory, InventoryStore, JsonInventoryStore, Machinery, PersistenceError, Personnel,
    ResourceStatus, UsageAction, load_inventory_from_json, load_machinery_from_csv,
    save_inventory_to_json, save_machinery_to_csv,
};
use std::fs;
use tempfile::{NamedTempFile, tempdir};

fn build_sample_inventory() -> Inventory {
    let mut inventory = Inventory::new();
    inventory
        .register_machinery(
            Machinery::with_id("m1", "Tractor 1", "Tractor")
                .purchased_on("2021-04-12")
                .maintained_on("2025-05-01T08:30:00"),
        )
        .unwrap();
    inventory
        .register_machinery(Machinery::with_id("m2", "Harvester", "Harvester"))
        .unwrap();
    let mut person = Personnel::new("Ana", "Operator", "Field").with_skills(["tractor", "gps"]);
    person.id = "p1".into();
    inventory.register_personnel(person).unwrap();
    inventory.assign_machinery("m2", "Harvest", Some("South")).unwrap();
    inventory
}

#[test]
fn json_snapshot_round_trip() {
    let inventory = build_sample_inventory();
    let file = NamedTempFile::new().unwrap();
    save_inventory_to_json(&inventory, file.path()).unwrap();

    let loaded = load_inventory_from_json(file.path()).unwrap();
    assert_eq!(loaded.resources(), inventory.resources());
    assert_eq!(loaded.usage_log(), inventory.usage_log());
    assert_eq!(
        loaded.get_machinery("m2").unwrap().status,
        ResourceStatus::InUse
    );
    assert_eq!(
        loaded.get_personnel("p1").unwrap().skills,
        vec!["tractor".to_string(), "gps".to_string()]
    );
}

#[test]
fn json_snapshot_rejects_duplicate_ids() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"{
            "machinery": [
                {"id": "x", "name": "A", "type": "Tractor", "status": "available"}
            ],
            "personnel": [
                {"id": "x", "name": "B", "role": "Operator", "department": "Field", "status": "available"}
            ]
        }"#,
    )
    .unwrap();

    let err = load_inventory_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn json_snapshot_reports_malformed_documents() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "{ not json").unwrap();
    let err = load_inventory_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Serialization(_)));
}

#[test]
fn directory_store_writes_three_documents() {
    let dir = tempdir().unwrap();
    let store = JsonInventoryStore::new(dir.path().join("data")).unwrap();
    assert!(store.load_inventory().unwrap().is_none());

    let inventory = build_sample_inventory();
    store.save_inventory(&inventory).unwrap();
    for name in ["machinery.json", "personnel.json", "usage_log.json"] {
        assert!(store.data_dir().join(name).exists(), "missing {name}");
    }

    let loaded = store.load_inventory().unwrap().expect("inventory stored");
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.usage_log().len(), inventory.usage_log().len());
    assert_eq!(
        loaded.usage_log().last().unwrap().action,
        UsageAction::Assignment
    );
}

#[test]
fn directory_store_tolerates_missing_usage_log() {
    let dir = tempdir().unwrap();
    let store = JsonInventoryStore::new(dir.path()).unwrap();
    fs::write(
        dir.path().join("machinery.json"),
        r#"[{"id": "m9", "name": "Old sprayer", "type": "Sprayer", "status": "available"}]"#,
    )
    .unwrap();

    let loaded = store.load_inventory().unwrap().expect("machinery present");
    assert_eq!(loaded.len(), 1);
    assert!(loaded.usage_log().is_empty());
    assert_eq!(loaded.get_machinery("m9").unwrap().machine_type, "Sprayer");
}

#[test]
fn machinery_csv_round_trip() {
    let inventory = build_sample_inventory();
    let file = NamedTempFile::new().unwrap();
    save_machinery_to_csv(&inventory, file.path()).unwrap();

    let machinery = load_machinery_from_csv(file.path()).unwrap();
    let expected: Vec<Machinery> = inventory.machinery().cloned().collect();
    assert_eq!(machinery, expected);
    assert!(machinery[1].purchase_date.is_none());
}

#[test]
fn machinery_csv_rejects_unknown_status() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,name,type,status,last_maintenance_date,purchase_date\nm1,Tractor 1,Tractor,broken,,\n",
    )
    .unwrap();
    let err = load_machinery_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(msg) if msg.contains("broken")));
}

#[test]
fn machinery_csv_requires_rows() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,name,type,status,last_maintenance_date,purchase_date\n",
    )
    .unwrap();
    assert!(matches!(
        load_machinery_from_csv(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}

fn interleaved_inventory() -> Inventory {
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
    inventory
}

fn ids(inventory: &Inventory) -> Vec<&str> {
    inventory.resources().iter().map(|r| r.id()).collect()
}

#[test]
fn json_snapshot_keeps_registration_order() {
    let inventory = interleaved_inventory();
    let file = NamedTempFile::new().unwrap();
    save_inventory_to_json(&inventory, file.path()).unwrap();

    let loaded = load_inventory_from_json(file.path()).unwrap();
    assert_eq!(ids(&loaded), vec!["m1", "p1", "m2"]);
}

#[test]
fn directory_store_keeps_registration_order() {
    let dir = tempdir().unwrap();
    let store = JsonInventoryStore::new(dir.path()).unwrap();
    store.save_inventory(&interleaved_inventory()).unwrap();

    let loaded = store.load_inventory().unwrap().unwrap();
    assert_eq!(ids(&loaded), vec!["m1", "p1", "m2"]);
}

#[test]
fn loads_reject_status_of_the_other_category() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"{"machinery": [{"id": "m1", "name": "A", "type": "Tractor", "status": "assigned"}]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_inventory_from_json(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));

    let dir = tempdir().unwrap();
    let store = JsonInventoryStore::new(dir.path()).unwrap();
    fs::write(
        dir.path().join("personnel.json"),
        r#"[{"id": "p1", "name": "B", "role": "Operator", "department": "Field", "status": "in_use"}]"#,
    )
    .unwrap();
    assert!(matches!(
        store.load_inventory(),
        Err(PersistenceError::InvalidData(_))
    ));

    let csv = NamedTempFile::new().unwrap();
    fs::write(
        csv.path(),
        "id,name,type,status,last_maintenance_date,purchase_date\nm1,Tractor 1,Tractor,assigned,,\n",
    )
    .unwrap();
    assert!(matches!(
        load_machinery_from_csv(csv.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}
