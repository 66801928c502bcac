use super::efficiency::EfficiencyScorer;
use crate::resource::Machinery;
use crate::task::Task;
use std::collections::BTreeMap;
use tracing::debug;

/// Task id -> resource id.
pub type AssignmentMap = BTreeMap<String, String>;

/// Greedy priority-first matching of tasks to machines.
///
/// Tasks are visited by descending priority (stable for ties). Each task takes
/// the best-scoring machine of its own type still in the pool, or the best of
/// the whole pool when none of its type remain. A machine leaves the pool once
/// taken, so the result never maps two tasks to the same machine.
pub struct AssignmentPass<'a> {
    machinery: &'a [Machinery],
    scorer: &'a EfficiencyScorer,
}

impl<'a> AssignmentPass<'a> {
    pub fn new(machinery: &'a [Machinery], scorer: &'a EfficiencyScorer) -> Self {
        Self { machinery, scorer }
    }

    pub fn execute(&self, tasks: &[Task]) -> AssignmentMap {
        let mut assignments = AssignmentMap::new();

        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut pool: Vec<&Machinery> = self.machinery.iter().collect();

        for task in ordered {
            if pool.is_empty() {
                debug!(task_id = %task.id, "machinery pool exhausted");
                break;
            }

            let Some(pool_idx) = self.best_candidate(&pool, task) else {
                continue;
            };
            let chosen = pool.remove(pool_idx);
            debug!(
                task_id = %task.id,
                machine_id = %chosen.id,
                priority = task.priority,
                "assigned machine"
            );
            assignments.insert(task.id.clone(), chosen.id.clone());
        }

        assignments
    }

    /// Index into `pool` of the machine to hand to `task`.
    fn best_candidate(&self, pool: &[&Machinery], task: &Task) -> Option<usize> {
        let has_matching_type = pool.iter().any(|m| m.machine_type == task.task_type);

        let mut best: Option<(usize, f64)> = None;
        for (idx, machine) in pool.iter().enumerate() {
            if has_matching_type && machine.machine_type != task.task_type {
                continue;
            }
            let score = self.scorer.score(machine, task);
            // strict comparison keeps the first machine seen among equal scores
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}
