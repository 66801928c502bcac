pub mod calculations;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod inventory;
pub mod logging;
pub mod optimizer;
pub mod persistence;
pub mod report;
pub mod resource;
pub(crate) mod resource_validation;
pub mod task;
pub mod usage;

pub use config::{ConfigError, FarmConfig};
pub use inventory::{Inventory, InventoryError, MachineryUpdate, PersonnelUpdate};
pub use optimizer::{
    AssignmentMap, calculate_efficiency, calculate_efficiency_at, find_conflicts,
    optimize_assignment, optimize_assignment_at, priorities_of, resolve_conflicts,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteInventoryStore;
pub use persistence::{
    InventoryStore, JsonInventoryStore, PersistenceError, load_inventory_from_json,
    load_machinery_from_csv, save_inventory_to_json, save_machinery_to_csv,
};
pub use report::ResourceReport;
pub use resource::{
    Machinery, ParseNameError, Personnel, Resource, ResourceCategory, ResourceStatus,
};
pub use task::Task;
pub use usage::{UsageAction, UsageEntry, UsageFilter};
