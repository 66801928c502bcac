use serde::{Deserialize, Serialize};

/// A unit of field work that needs a machine.
///
/// Only `id`, `task_type` and `priority` matter to the optimizer; `name` and
/// `location` are carried for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    /// Higher is more urgent. Missing priorities deserialize as 0.
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, task_type: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            task_type: task_type.into(),
            priority,
            location: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
