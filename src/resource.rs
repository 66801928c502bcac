use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Returned when a status, category or action name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
}

impl ParseNameError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lifecycle state of a resource. Machinery cycles between `Available` and
/// `InUse`, personnel between `Available` and `Assigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    #[default]
    Available,
    InUse,
    Assigned,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "available",
            ResourceStatus::InUse => "in_use",
            ResourceStatus::Assigned => "assigned",
        }
    }

}

impl FromStr for ResourceStatus {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "available" => Ok(ResourceStatus::Available),
            "in_use" => Ok(ResourceStatus::InUse),
            "assigned" => Ok(ResourceStatus::Assigned),
            _ => Err(ParseNameError::new("status", value)),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Machinery,
    Personnel,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Machinery => "machinery",
            ResourceCategory::Personnel => "personnel",
        }
    }

}

impl FromStr for ResourceCategory {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "machinery" => Ok(ResourceCategory::Machinery),
            "personnel" => Ok(ResourceCategory::Personnel),
            _ => Err(ParseNameError::new("category", value)),
        }
    }
}

pub(crate) fn new_resource_id() -> String {
    Uuid::new_v4().to_string()
}

/// A piece of farm equipment (tractor, harvester, sprayer, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machinery {
    pub id: String,
    pub name: String,
    /// Free-form equipment type, compared case-sensitively against task types.
    #[serde(rename = "type")]
    pub machine_type: String,
    #[serde(default)]
    pub status: ResourceStatus,
    /// Date (or timestamp) of the last service. Presence alone marks the machine as maintained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance_date: Option<String>,
    /// Purchase date as entered, expected in `YYYY-MM-DD` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
}

impl Machinery {
    pub fn new(name: impl Into<String>, machine_type: impl Into<String>) -> Self {
        Self::with_id(new_resource_id(), name, machine_type)
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        machine_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            machine_type: machine_type.into(),
            status: ResourceStatus::Available,
            last_maintenance_date: None,
            purchase_date: None,
        }
    }

    pub fn purchased_on(mut self, date: impl Into<String>) -> Self {
        self.purchase_date = Some(date.into());
        self
    }

    pub fn maintained_on(mut self, date: impl Into<String>) -> Self {
        self.last_maintenance_date = Some(date.into());
        self
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }

    pub fn has_maintenance_record(&self) -> bool {
        self.last_maintenance_date
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }
}

/// A member of the farm crew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

impl Personnel {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: new_resource_id(),
            name: name.into(),
            role: role.into(),
            department: department.into(),
            status: ResourceStatus::Available,
            skills: Vec::new(),
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// Any resource held by an [`crate::Inventory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Resource {
    Machinery(Machinery),
    Personnel(Personnel),
}

impl Resource {
    pub fn id(&self) -> &str {
        match self {
            Resource::Machinery(m) => &m.id,
            Resource::Personnel(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Resource::Machinery(m) => &m.name,
            Resource::Personnel(p) => &p.name,
        }
    }

    /// Machine type for machinery, role for personnel.
    pub fn kind(&self) -> &str {
        match self {
            Resource::Machinery(m) => &m.machine_type,
            Resource::Personnel(p) => &p.role,
        }
    }

    pub fn status(&self) -> ResourceStatus {
        match self {
            Resource::Machinery(m) => m.status,
            Resource::Personnel(p) => p.status,
        }
    }

    pub fn category(&self) -> ResourceCategory {
        match self {
            Resource::Machinery(_) => ResourceCategory::Machinery,
            Resource::Personnel(_) => ResourceCategory::Personnel,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status() == ResourceStatus::Available
    }

    pub fn as_machinery(&self) -> Option<&Machinery> {
        match self {
            Resource::Machinery(m) => Some(m),
            Resource::Personnel(_) => None,
        }
    }

    pub fn as_personnel(&self) -> Option<&Personnel> {
        match self {
            Resource::Personnel(p) => Some(p),
            Resource::Machinery(_) => None,
        }
    }
}

impl From<Machinery> for Resource {
    fn from(value: Machinery) -> Self {
        Resource::Machinery(value)
    }
}

impl From<Personnel> for Resource {
    fn from(value: Personnel) -> Self {
        Resource::Personnel(value)
    }
}
