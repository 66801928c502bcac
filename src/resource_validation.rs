use crate::calculations::efficiency::parse_purchase_date;
use crate::resource::{Machinery, Personnel, Resource, ResourceStatus};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResourceValidationError {
    message: String,
}

impl ResourceValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn require_text(id: &str, field: &str, value: &str) -> Result<(), ResourceValidationError> {
    if value.trim().is_empty() {
        return Err(ResourceValidationError::new(format!(
            "resource {id} requires a non-empty {field}"
        )));
    }
    Ok(())
}

pub fn validate_machinery(machine: &Machinery) -> Result<(), ResourceValidationError> {
    if machine.id.trim().is_empty() {
        return Err(ResourceValidationError::new(
            "machinery record requires a non-empty id",
        ));
    }
    require_text(&machine.id, "name", &machine.name)?;
    require_text(&machine.id, "type", &machine.machine_type)?;

    // machinery cycles between available and in_use only
    if machine.status == ResourceStatus::Assigned {
        return Err(ResourceValidationError::new(format!(
            "machinery {} cannot have status {}",
            machine.id, machine.status
        )));
    }

    // Tolerated: the optimizer skips the age penalty for such machines.
    if let Some(raw) = machine.purchase_date.as_deref() {
        if !raw.trim().is_empty() && parse_purchase_date(raw).is_err() {
            warn!(
                machine_id = %machine.id,
                purchase_date = raw,
                "purchase date is not in YYYY-MM-DD form"
            );
        }
    }
    Ok(())
}

pub fn validate_personnel(person: &Personnel) -> Result<(), ResourceValidationError> {
    if person.id.trim().is_empty() {
        return Err(ResourceValidationError::new(
            "personnel record requires a non-empty id",
        ));
    }
    require_text(&person.id, "name", &person.name)?;
    require_text(&person.id, "role", &person.role)?;
    require_text(&person.id, "department", &person.department)?;

    // personnel cycle between available and assigned only
    if person.status == ResourceStatus::InUse {
        return Err(ResourceValidationError::new(format!(
            "personnel {} cannot have status {}",
            person.id, person.status
        )));
    }
    Ok(())
}

pub fn validate_resource(resource: &Resource) -> Result<(), ResourceValidationError> {
    match resource {
        Resource::Machinery(machine) => validate_machinery(machine),
        Resource::Personnel(person) => validate_personnel(person),
    }
}

fn ensure_unique_ids<'a, I>(ids: I) -> Result<(), ResourceValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen_ids = HashSet::new();
    for id in ids {
        if !seen_ids.insert(id) {
            return Err(ResourceValidationError::new(format!(
                "duplicate resource id {id}"
            )));
        }
    }
    Ok(())
}

/// Checks every record and that ids are unique across the collection.
pub fn validate_resource_collection(resources: &[Resource]) -> Result<(), ResourceValidationError> {
    for resource in resources {
        validate_resource(resource)?;
    }
    ensure_unique_ids(resources.iter().map(Resource::id))
}

pub fn validate_machinery_collection(
    machinery: &[Machinery],
) -> Result<(), ResourceValidationError> {
    for machine in machinery {
        validate_machinery(machine)?;
    }
    ensure_unique_ids(machinery.iter().map(|m| m.id.as_str()))
}
