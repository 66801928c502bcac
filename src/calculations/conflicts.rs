use super::assignment::AssignmentMap;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Resources claimed by more than one task, with the claiming task ids in map order.
pub fn find_conflicts(assignments: &AssignmentMap) -> BTreeMap<String, Vec<String>> {
    let mut by_resource: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (task_id, resource_id) in assignments {
        by_resource
            .entry(resource_id.clone())
            .or_default()
            .push(task_id.clone());
    }
    by_resource.retain(|_, task_ids| task_ids.len() > 1);
    by_resource
}

pub struct ConflictResolver<'a> {
    priorities: &'a HashMap<String, i32>,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(priorities: &'a HashMap<String, i32>) -> Self {
        Self { priorities }
    }

    fn priority_of(&self, task_id: &str) -> i32 {
        self.priorities.get(task_id).copied().unwrap_or(0)
    }

    /// Keeps only the highest-priority task on each double-booked resource.
    ///
    /// Among tasks of equal priority the one that comes first in the map wins.
    /// Entries for resources with a single task are returned untouched.
    pub fn execute(&self, assignments: &AssignmentMap) -> AssignmentMap {
        let mut resolved = assignments.clone();

        for (resource_id, mut task_ids) in find_conflicts(assignments) {
            task_ids.sort_by(|a, b| self.priority_of(b).cmp(&self.priority_of(a)));
            let (kept, dropped) = task_ids.split_at(1);
            for task_id in dropped {
                resolved.remove(task_id);
            }
            debug!(
                resource_id = %resource_id,
                kept = %kept[0],
                dropped = dropped.len(),
                "resolved assignment conflict"
            );
        }

        resolved
    }
}
