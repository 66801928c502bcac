use super::{InventoryStore, PersistenceError, PersistenceResult, Positioned};
use crate::Inventory;
use crate::resource::{Machinery, Personnel, ResourceStatus};
use crate::resource_validation;
use crate::usage::UsageEntry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

const MACHINERY_FILE: &str = "machinery.json";
const PERSONNEL_FILE: &str = "personnel.json";
const USAGE_LOG_FILE: &str = "usage_log.json";

#[derive(Serialize, Deserialize)]
struct InventorySnapshot {
    #[serde(default)]
    machinery: Vec<Positioned<Machinery>>,
    #[serde(default)]
    personnel: Vec<Positioned<Personnel>>,
    #[serde(default)]
    usage_log: Vec<UsageEntry>,
}

impl InventorySnapshot {
    fn from_inventory(inventory: &Inventory) -> PersistenceResult<Self> {
        super::validate_inventory(inventory)?;
        let (machinery, personnel) = super::split_positioned(inventory);
        Ok(Self {
            machinery,
            personnel,
            usage_log: inventory.usage_log().to_vec(),
        })
    }

    fn into_inventory(self) -> PersistenceResult<Inventory> {
        let resources = super::merge_positioned(self.machinery, self.personnel);
        Ok(Inventory::from_resources(resources, self.usage_log)?)
    }
}

pub fn save_inventory_to_json<P: AsRef<Path>>(
    inventory: &Inventory,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = InventorySnapshot::from_inventory(inventory)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    info!(path = %path.as_ref().display(), resources = inventory.len(), "saved inventory");
    Ok(())
}

pub fn load_inventory_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Inventory> {
    let file = File::open(path.as_ref())?;
    let snapshot: InventorySnapshot = serde_json::from_reader(file)?;
    let inventory = snapshot.into_inventory()?;
    info!(path = %path.as_ref().display(), resources = inventory.len(), "loaded inventory");
    Ok(inventory)
}

/// Keeps an inventory as three JSON documents in one data directory:
/// `machinery.json`, `personnel.json` and `usage_log.json`.
pub struct JsonInventoryStore {
    data_dir: PathBuf,
}

impl JsonInventoryStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> PersistenceResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> PersistenceResult<()> {
        let file = File::create(self.data_dir.join(name))?;
        serde_json::to_writer_pretty(file, value)?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> PersistenceResult<Option<T>> {
        let path = self.data_dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        Ok(Some(serde_json::from_reader(file)?))
    }
}

impl InventoryStore for JsonInventoryStore {
    fn save_inventory(&self, inventory: &Inventory) -> PersistenceResult<()> {
        let snapshot = InventorySnapshot::from_inventory(inventory)?;
        self.write_json(MACHINERY_FILE, &snapshot.machinery)?;
        self.write_json(PERSONNEL_FILE, &snapshot.personnel)?;
        self.write_json(USAGE_LOG_FILE, &snapshot.usage_log)?;
        info!(dir = %self.data_dir.display(), resources = inventory.len(), "saved inventory");
        Ok(())
    }

    fn load_inventory(&self) -> PersistenceResult<Option<Inventory>> {
        let machinery: Option<Vec<Positioned<Machinery>>> = self.read_json(MACHINERY_FILE)?;
        let personnel: Option<Vec<Positioned<Personnel>>> = self.read_json(PERSONNEL_FILE)?;
        if machinery.is_none() && personnel.is_none() {
            return Ok(None);
        }
        let snapshot = InventorySnapshot {
            machinery: machinery.unwrap_or_default(),
            personnel: personnel.unwrap_or_default(),
            usage_log: self.read_json(USAGE_LOG_FILE)?.unwrap_or_default(),
        };
        let inventory = snapshot.into_inventory()?;
        info!(dir = %self.data_dir.display(), resources = inventory.len(), "loaded inventory");
        Ok(Some(inventory))
    }
}

#[derive(Default, Serialize, Deserialize)]
struct MachineryCsvRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    machine_type: String,
    status: String,
    #[serde(default)]
    last_maintenance_date: String,
    #[serde(default)]
    purchase_date: String,
}

impl From<&Machinery> for MachineryCsvRecord {
    fn from(machine: &Machinery) -> Self {
        Self {
            id: machine.id.clone(),
            name: machine.name.clone(),
            machine_type: machine.machine_type.clone(),
            status: machine.status.as_str().to_string(),
            last_maintenance_date: machine.last_maintenance_date.clone().unwrap_or_default(),
            purchase_date: machine.purchase_date.clone().unwrap_or_default(),
        }
    }
}

impl MachineryCsvRecord {
    fn into_machinery(self) -> PersistenceResult<Machinery> {
        let status = if self.status.trim().is_empty() {
            ResourceStatus::Available
        } else {
            self.status
                .trim()
                .parse::<ResourceStatus>()
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?
        };
        let mut machine = Machinery::with_id(self.id, self.name, self.machine_type);
        machine.status = status;
        machine.last_maintenance_date = parse_string_option(self.last_maintenance_date);
        machine.purchase_date = parse_string_option(self.purchase_date);
        Ok(machine)
    }
}

/// Writes the inventory's machinery as CSV. Personnel and the usage log are not included.
pub fn save_machinery_to_csv<P: AsRef<Path>>(
    inventory: &Inventory,
    path: P,
) -> PersistenceResult<()> {
    super::validate_inventory(inventory)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for machine in inventory.machinery() {
        writer.serialize(MachineryCsvRecord::from(machine))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_machinery_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Machinery>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut machinery = Vec::new();
    for record in reader.deserialize::<MachineryCsvRecord>() {
        machinery.push(record?.into_machinery()?);
    }

    if machinery.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no machinery".into(),
        ));
    }

    resource_validation::validate_machinery_collection(&machinery)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    Ok(machinery)
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
