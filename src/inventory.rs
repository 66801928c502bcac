use crate::optimizer::AssignmentMap;
use crate::report::ResourceReport;
use crate::resource::{Machinery, Personnel, Resource, ResourceCategory, ResourceStatus};
use crate::resource_validation::{self, ResourceValidationError};
use crate::task::Task;
use crate::usage::{UsageAction, UsageEntry, UsageFilter};
use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const MAINTENANCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("machinery {0} not found")]
    MachineryNotFound(String),
    #[error("personnel {0} not found")]
    PersonnelNotFound(String),
    #[error("resource id {0} is already registered")]
    DuplicateId(String),
    #[error("invalid resource: {0}")]
    Invalid(#[from] ResourceValidationError),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Partial update of a machinery record. `None` leaves the field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub last_maintenance_date: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
}

impl MachineryUpdate {
    fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.machine_type.is_some() {
            fields.push("type");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.last_maintenance_date.is_some() {
            fields.push("last_maintenance_date");
        }
        if self.purchase_date.is_some() {
            fields.push("purchase_date");
        }
        fields
    }
}

/// Partial update of a personnel record. `None` leaves the field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonnelUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl PersonnelUpdate {
    fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.role.is_some() {
            fields.push("role");
        }
        if self.department.is_some() {
            fields.push("department");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.skills.is_some() {
            fields.push("skills");
        }
        fields
    }
}

/// The farm's machinery and personnel, kept in registration order, plus the
/// log of every change made to them.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    resources: Vec<Resource>,
    usage_log: Vec<UsageEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an inventory from stored records, in the order given, without
    /// logging registrations.
    pub fn from_resources(
        resources: Vec<Resource>,
        usage_log: Vec<UsageEntry>,
    ) -> InventoryResult<Self> {
        resource_validation::validate_resource_collection(&resources)?;
        Ok(Self {
            resources,
            usage_log,
        })
    }

    /// Like [`Inventory::from_resources`], with all machinery ahead of all personnel.
    pub fn from_parts(
        machinery: Vec<Machinery>,
        personnel: Vec<Personnel>,
        usage_log: Vec<UsageEntry>,
    ) -> InventoryResult<Self> {
        let resources = machinery
            .into_iter()
            .map(Resource::from)
            .chain(personnel.into_iter().map(Resource::from))
            .collect();
        Self::from_resources(resources, usage_log)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id)
    }

    /// Resources whose machine type or personnel role equals `kind` exactly.
    pub fn list_by_type(&self, kind: &str) -> Vec<&Resource> {
        self.resources.iter().filter(|r| r.kind() == kind).collect()
    }

    pub fn list_available(&self) -> Vec<&Resource> {
        self.resources.iter().filter(|r| r.is_available()).collect()
    }

    pub fn list_by_category(&self, category: ResourceCategory) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| r.category() == category)
            .collect()
    }

    pub fn machinery(&self) -> impl Iterator<Item = &Machinery> {
        self.resources.iter().filter_map(Resource::as_machinery)
    }

    pub fn personnel(&self) -> impl Iterator<Item = &Personnel> {
        self.resources.iter().filter_map(Resource::as_personnel)
    }

    pub fn get_machinery(&self, id: &str) -> Option<&Machinery> {
        self.machinery().find(|m| m.id == id)
    }

    pub fn get_personnel(&self, id: &str) -> Option<&Personnel> {
        self.personnel().find(|p| p.id == id)
    }

    pub fn machinery_by_type(&self, machine_type: &str) -> Vec<&Machinery> {
        self.machinery()
            .filter(|m| m.machine_type == machine_type)
            .collect()
    }

    /// Owned snapshot of the machinery currently free, for the optimizer.
    pub fn available_machinery(&self) -> Vec<Machinery> {
        self.machinery().filter(|m| m.is_available()).cloned().collect()
    }

    pub fn personnel_by_department(&self, department: &str) -> Vec<&Personnel> {
        self.personnel()
            .filter(|p| p.department == department)
            .collect()
    }

    pub fn personnel_by_skill(&self, skill: &str) -> Vec<&Personnel> {
        self.personnel().filter(|p| p.has_skill(skill)).collect()
    }

    pub fn available_personnel(&self) -> Vec<&Personnel> {
        self.personnel().filter(|p| p.is_available()).collect()
    }

    pub fn register_machinery(&mut self, machine: Machinery) -> InventoryResult<Machinery> {
        resource_validation::validate_machinery(&machine)?;
        self.ensure_unique(&machine.id)?;
        info!(
            machine_id = %machine.id,
            machine_type = %machine.machine_type,
            "registered machinery"
        );
        self.log(
            UsageEntry::new(
                ResourceCategory::Machinery,
                &machine.id,
                &machine.name,
                UsageAction::Registration,
            )
            .with_details(format!("Registered new {}", machine.machine_type)),
        );
        self.resources.push(Resource::Machinery(machine.clone()));
        Ok(machine)
    }

    pub fn register_personnel(&mut self, person: Personnel) -> InventoryResult<Personnel> {
        resource_validation::validate_personnel(&person)?;
        self.ensure_unique(&person.id)?;
        info!(personnel_id = %person.id, role = %person.role, "registered personnel");
        self.log(
            UsageEntry::new(
                ResourceCategory::Personnel,
                &person.id,
                &person.name,
                UsageAction::Registration,
            )
            .with_details(format!("Registered new {}", person.role)),
        );
        self.resources.push(Resource::Personnel(person.clone()));
        Ok(person)
    }

    pub fn update_machinery(
        &mut self,
        id: &str,
        update: MachineryUpdate,
    ) -> InventoryResult<Machinery> {
        let fields = update.changed_fields();
        let machine = self.machinery_mut(id)?;
        let mut candidate = machine.clone();
        if let Some(name) = update.name {
            candidate.name = name;
        }
        if let Some(machine_type) = update.machine_type {
            candidate.machine_type = machine_type;
        }
        if let Some(status) = update.status {
            candidate.status = status;
        }
        if let Some(date) = update.last_maintenance_date {
            candidate.last_maintenance_date = Some(date);
        }
        if let Some(date) = update.purchase_date {
            candidate.purchase_date = Some(date);
        }
        resource_validation::validate_machinery(&candidate)?;
        *machine = candidate.clone();

        self.log(
            UsageEntry::new(
                ResourceCategory::Machinery,
                id,
                &candidate.name,
                UsageAction::Update,
            )
            .with_details(format!("Updated {}", fields.join(", "))),
        );
        Ok(candidate)
    }

    pub fn update_personnel(
        &mut self,
        id: &str,
        update: PersonnelUpdate,
    ) -> InventoryResult<Personnel> {
        let fields = update.changed_fields();
        let person = self.personnel_mut(id)?;
        let mut candidate = person.clone();
        if let Some(name) = update.name {
            candidate.name = name;
        }
        if let Some(role) = update.role {
            candidate.role = role;
        }
        if let Some(department) = update.department {
            candidate.department = department;
        }
        if let Some(status) = update.status {
            candidate.status = status;
        }
        if let Some(skills) = update.skills {
            candidate.skills = skills;
        }
        resource_validation::validate_personnel(&candidate)?;
        *person = candidate.clone();

        self.log(
            UsageEntry::new(
                ResourceCategory::Personnel,
                id,
                &candidate.name,
                UsageAction::Update,
            )
            .with_details(format!("Updated {}", fields.join(", "))),
        );
        Ok(candidate)
    }

    /// Marks an available machine as in use. Returns `Ok(false)` when the
    /// machine is not available.
    pub fn assign_machinery(
        &mut self,
        id: &str,
        task: &str,
        location: Option<&str>,
    ) -> InventoryResult<bool> {
        let machine = self.machinery_mut(id)?;
        if machine.status != ResourceStatus::Available {
            return Ok(false);
        }
        machine.status = ResourceStatus::InUse;
        let name = machine.name.clone();
        info!(machine_id = id, task, "machinery assigned");
        self.log(
            UsageEntry::new(ResourceCategory::Machinery, id, name, UsageAction::Assignment)
                .with_task(task, location.map(str::to_string)),
        );
        Ok(true)
    }

    pub fn release_machinery(&mut self, id: &str) -> InventoryResult<bool> {
        let machine = self.machinery_mut(id)?;
        if machine.status != ResourceStatus::InUse {
            return Ok(false);
        }
        machine.status = ResourceStatus::Available;
        let name = machine.name.clone();
        info!(machine_id = id, "machinery released");
        self.log(
            UsageEntry::new(ResourceCategory::Machinery, id, name, UsageAction::Release)
                .with_details("Released from task"),
        );
        Ok(true)
    }

    /// Stamps the machine's last maintenance with the current local time.
    pub fn record_maintenance(&mut self, id: &str) -> InventoryResult<bool> {
        let machine = self.machinery_mut(id)?;
        let stamp = Local::now()
            .naive_local()
            .format(MAINTENANCE_TIMESTAMP_FORMAT)
            .to_string();
        machine.last_maintenance_date = Some(stamp);
        let name = machine.name.clone();
        info!(machine_id = id, "maintenance recorded");
        self.log(
            UsageEntry::new(ResourceCategory::Machinery, id, name, UsageAction::Maintenance)
                .with_details("Maintenance performed"),
        );
        Ok(true)
    }

    pub fn assign_personnel(
        &mut self,
        id: &str,
        task: &str,
        location: Option<&str>,
    ) -> InventoryResult<bool> {
        let person = self.personnel_mut(id)?;
        if person.status != ResourceStatus::Available {
            return Ok(false);
        }
        person.status = ResourceStatus::Assigned;
        let name = person.name.clone();
        info!(personnel_id = id, task, "personnel assigned");
        self.log(
            UsageEntry::new(ResourceCategory::Personnel, id, name, UsageAction::Assignment)
                .with_task(task, location.map(str::to_string)),
        );
        Ok(true)
    }

    pub fn release_personnel(&mut self, id: &str) -> InventoryResult<bool> {
        let person = self.personnel_mut(id)?;
        if person.status != ResourceStatus::Assigned {
            return Ok(false);
        }
        person.status = ResourceStatus::Available;
        let name = person.name.clone();
        info!(personnel_id = id, "personnel released");
        self.log(
            UsageEntry::new(ResourceCategory::Personnel, id, name, UsageAction::Release)
                .with_details("Released from task"),
        );
        Ok(true)
    }

    /// Puts each machine of `assignments` to work on its task. Returns the ids
    /// of tasks whose machine was unknown or no longer available.
    pub fn apply_assignments(
        &mut self,
        assignments: &AssignmentMap,
        tasks: &[Task],
    ) -> Vec<String> {
        let mut rejected = Vec::new();
        for (task_id, machine_id) in assignments {
            let task = tasks.iter().find(|t| &t.id == task_id);
            let label = task
                .filter(|t| !t.name.is_empty())
                .map_or(task_id.as_str(), |t| t.name.as_str());
            let location = task.and_then(|t| t.location.as_deref());
            match self.assign_machinery(machine_id, label, location) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        task_id = %task_id,
                        machine_id = %machine_id,
                        "machine no longer available"
                    );
                    rejected.push(task_id.clone());
                }
                Err(err) => {
                    warn!(task_id = %task_id, error = %err, "could not apply assignment");
                    rejected.push(task_id.clone());
                }
            }
        }
        rejected
    }

    pub fn report(&self) -> ResourceReport {
        ResourceReport::from_resources(&self.resources)
    }

    pub fn usage_log(&self) -> &[UsageEntry] {
        &self.usage_log
    }

    pub fn usage_history(&self, filter: &UsageFilter) -> Vec<&UsageEntry> {
        self.usage_log.iter().filter(|e| filter.matches(e)).collect()
    }

    fn ensure_unique(&self, id: &str) -> InventoryResult<()> {
        if self.get(id).is_some() {
            return Err(InventoryError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn machinery_mut(&mut self, id: &str) -> InventoryResult<&mut Machinery> {
        self.resources
            .iter_mut()
            .find_map(|r| match r {
                Resource::Machinery(m) if m.id == id => Some(m),
                _ => None,
            })
            .ok_or_else(|| InventoryError::MachineryNotFound(id.to_string()))
    }

    fn personnel_mut(&mut self, id: &str) -> InventoryResult<&mut Personnel> {
        self.resources
            .iter_mut()
            .find_map(|r| match r {
                Resource::Personnel(p) if p.id == id => Some(p),
                _ => None,
            })
            .ok_or_else(|| InventoryError::PersonnelNotFound(id.to_string()))
    }

    fn log(&mut self, entry: UsageEntry) {
        self.usage_log.push(entry);
    }
}
