use crate::Inventory;
use crate::inventory::InventoryError;
use crate::resource::{Machinery, Personnel, Resource};
use crate::resource_validation;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value.to_string())
    }
}

impl From<InventoryError> for PersistenceError {
    fn from(value: InventoryError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Durable home for an [`Inventory`].
pub trait InventoryStore {
    fn save_inventory(&self, inventory: &Inventory) -> PersistenceResult<()>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load_inventory(&self) -> PersistenceResult<Option<Inventory>>;
}

pub fn validate_inventory(inventory: &Inventory) -> PersistenceResult<()> {
    resource_validation::validate_resource_collection(inventory.resources())
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

/// A stored record plus its index in the inventory's registration order.
#[derive(Serialize, Deserialize)]
pub(crate) struct Positioned<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(flatten)]
    pub record: T,
}

pub(crate) fn split_positioned(
    inventory: &Inventory,
) -> (Vec<Positioned<Machinery>>, Vec<Positioned<Personnel>>) {
    let mut machinery = Vec::new();
    let mut personnel = Vec::new();
    for (position, resource) in inventory.resources().iter().enumerate() {
        match resource {
            Resource::Machinery(m) => machinery.push(Positioned {
                position: Some(position),
                record: m.clone(),
            }),
            Resource::Personnel(p) => personnel.push(Positioned {
                position: Some(position),
                record: p.clone(),
            }),
        }
    }
    (machinery, personnel)
}

/// Interleaves both collections back into registration order. Records
/// without a position follow the positioned ones, machinery first.
pub(crate) fn merge_positioned(
    machinery: Vec<Positioned<Machinery>>,
    personnel: Vec<Positioned<Personnel>>,
) -> Vec<Resource> {
    let mut ordered: Vec<(usize, Resource)> = machinery
        .into_iter()
        .map(|m| (m.position.unwrap_or(usize::MAX), Resource::from(m.record)))
        .chain(
            personnel
                .into_iter()
                .map(|p| (p.position.unwrap_or(usize::MAX), Resource::from(p.record))),
        )
        .collect();
    ordered.sort_by_key(|(position, _)| *position);
    ordered.into_iter().map(|(_, resource)| resource).collect()
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonInventoryStore, load_inventory_from_json, load_machinery_from_csv, save_inventory_to_json,
    save_machinery_to_csv,
};
