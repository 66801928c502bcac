use crate::resource::{ParseNameError, ResourceCategory};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    Registration,
    Update,
    Assignment,
    Release,
    Maintenance,
}

impl UsageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageAction::Registration => "registration",
            UsageAction::Update => "update",
            UsageAction::Assignment => "assignment",
            UsageAction::Release => "release",
            UsageAction::Maintenance => "maintenance",
        }
    }

}

impl FromStr for UsageAction {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "registration" => Ok(UsageAction::Registration),
            "update" => Ok(UsageAction::Update),
            "assignment" => Ok(UsageAction::Assignment),
            "release" => Ok(UsageAction::Release),
            "maintenance" => Ok(UsageAction::Maintenance),
            _ => Err(ParseNameError::new("action", value)),
        }
    }
}

impl fmt::Display for UsageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the resource usage log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub timestamp: NaiveDateTime,
    pub resource_category: ResourceCategory,
    pub resource_id: String,
    pub resource_name: String,
    pub action: UsageAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl UsageEntry {
    pub fn new(
        resource_category: ResourceCategory,
        resource_id: impl Into<String>,
        resource_name: impl Into<String>,
        action: UsageAction,
    ) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            resource_category,
            resource_id: resource_id.into(),
            resource_name: resource_name.into(),
            action,
            task: None,
            location: None,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_task(mut self, task: impl Into<String>, location: Option<String>) -> Self {
        self.task = Some(task.into());
        self.location = location;
        self
    }
}

/// Optional filters for usage history queries. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageFilter {
    #[serde(default)]
    pub resource_category: Option<ResourceCategory>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub action: Option<UsageAction>,
}

impl UsageFilter {
    pub fn matches(&self, entry: &UsageEntry) -> bool {
        if let Some(category) = self.resource_category {
            if entry.resource_category != category {
                return false;
            }
        }
        if let Some(id) = self.resource_id.as_deref() {
            if entry.resource_id != id {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        true
    }
}
