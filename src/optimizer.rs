//! Machinery assignment optimizer.
//!
//! Pure functions over snapshots: nothing here mutates the machinery or tasks
//! it is given, and nothing here fails. Applying a proposed [`AssignmentMap`]
//! to an inventory is the caller's job (see
//! [`crate::Inventory::apply_assignments`]).

use crate::calculations::assignment::AssignmentPass;
use crate::calculations::conflicts::ConflictResolver;
use crate::calculations::efficiency::EfficiencyScorer;
use crate::resource::Machinery;
use crate::task::Task;
use chrono::{Local, NaiveDate};
use std::collections::HashMap;

pub use crate::calculations::assignment::AssignmentMap;
pub use crate::calculations::conflicts::find_conflicts;
pub use crate::calculations::efficiency::{age_in_years, parse_purchase_date};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Efficiency of `machine` for `task`, aging machines against today's local date.
pub fn calculate_efficiency(machine: &Machinery, task: &Task) -> f64 {
    calculate_efficiency_at(machine, task, today())
}

pub fn calculate_efficiency_at(machine: &Machinery, task: &Task, today: NaiveDate) -> f64 {
    EfficiencyScorer::new(today).score(machine, task)
}

/// Assigns at most one machine from `available` to each task, highest
/// priority first. Tasks left without a machine are absent from the result.
pub fn optimize_assignment(available: &[Machinery], tasks: &[Task]) -> AssignmentMap {
    optimize_assignment_at(available, tasks, today())
}

pub fn optimize_assignment_at(
    available: &[Machinery],
    tasks: &[Task],
    today: NaiveDate,
) -> AssignmentMap {
    let scorer = EfficiencyScorer::new(today);
    AssignmentPass::new(available, &scorer).execute(tasks)
}

/// Repairs a mapping that books one resource for several tasks, keeping the
/// highest-priority task per resource. Missing priorities count as 0.
pub fn resolve_conflicts(
    assignments: &AssignmentMap,
    priorities: &HashMap<String, i32>,
) -> AssignmentMap {
    ConflictResolver::new(priorities).execute(assignments)
}

/// Priority lookup for [`resolve_conflicts`] built from a task list.
pub fn priorities_of(tasks: &[Task]) -> HashMap<String, i32> {
    tasks
        .iter()
        .map(|task| (task.id.clone(), task.priority))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceStatus;
    use chrono::Duration;

    const EPS: f64 = 1e-9;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_before(today: NaiveDate, days: i64) -> String {
        (today - Duration::days(days)).format("%Y-%m-%d").to_string()
    }

    #[test]
    fn type_match_outscores_mismatch_by_three() {
        let today = d(2025, 6, 1);
        let tractor = Machinery::with_id("m1", "T1", "Tractor").purchased_on("2025-01-01");
        let harvester = Machinery::with_id("m2", "H1", "Harvester").purchased_on("2025-01-01");
        let task = Task::new("t1", "Tractor", 1);

        let matched = calculate_efficiency_at(&tractor, &task, today);
        let mismatched = calculate_efficiency_at(&harvester, &task, today);
        assert!((matched - mismatched - 3.0).abs() < EPS);
    }

    #[test]
    fn maintenance_adds_exactly_half_a_point() {
        let today = d(2025, 6, 1);
        let plain = Machinery::with_id("m1", "T1", "Tractor").purchased_on("2024-06-01");
        let serviced = plain.clone().maintained_on("2025-05-30");
        let task = Task::new("t1", "Tractor", 1);

        let diff = calculate_efficiency_at(&serviced, &task, today)
            - calculate_efficiency_at(&plain, &task, today);
        assert!((diff - 0.5).abs() < EPS);
    }

    #[test]
    fn age_penalty_caps_at_one() {
        let today = d(2025, 6, 1);
        let old = Machinery::with_id("m1", "Old", "Tractor").purchased_on(days_before(today, 3650));
        let task = Task::new("t1", "Tractor", 1);
        // 2.0 match + 0.5 available - 1.0 capped age
        let score = calculate_efficiency_at(&old, &task, today);
        assert!((score - 1.5).abs() < EPS);
    }

    #[test]
    fn fractional_age_penalty() {
        let today = d(2025, 6, 1);
        let machine =
            Machinery::with_id("m1", "New", "Sprayer").purchased_on(days_before(today, 73));
        let task = Task::new("t1", "Sprayer", 1);
        let score = calculate_efficiency_at(&machine, &task, today);
        assert!((score - (2.5 - 0.2)).abs() < EPS);
    }

    #[test]
    fn unparsable_purchase_date_skips_only_the_age_term() {
        let today = d(2025, 6, 1);
        let machine = Machinery::with_id("m1", "T1", "Tractor")
            .purchased_on("last spring")
            .maintained_on("2025-05-01");
        let task = Task::new("t1", "Tractor", 1);
        let score = calculate_efficiency_at(&machine, &task, today);
        assert!((score - 3.0).abs() < EPS);
    }

    #[test]
    fn busy_mismatched_machine_scores_negative() {
        let today = d(2025, 6, 1);
        let machine = Machinery::with_id("m1", "S1", "Sprayer").with_status(ResourceStatus::InUse);
        let task = Task::new("t1", "Tractor", 1);
        let score = calculate_efficiency_at(&machine, &task, today);
        assert!((score + 1.0).abs() < EPS);
    }

    #[test]
    fn empty_inputs_yield_empty_assignments() {
        let tasks = vec![Task::new("t1", "Tractor", 1)];
        assert!(optimize_assignment(&[], &tasks).is_empty());

        let machines = vec![Machinery::with_id("m1", "T1", "Tractor")];
        assert!(optimize_assignment(&machines, &[]).is_empty());
    }

    #[test]
    fn picks_freshly_maintained_newest_tractor() {
        let today = d(2025, 6, 1);
        let machines = vec![
            Machinery::with_id("old", "Tractor 3", "Tractor").purchased_on(days_before(today, 730)),
            Machinery::with_id("mid", "Tractor 2", "Tractor").purchased_on(days_before(today, 365)),
            Machinery::with_id("new", "Tractor 1", "Tractor")
                .purchased_on(days_before(today, 0))
                .maintained_on(days_before(today, 1)),
        ];
        let tasks = vec![Task::new("plow", "Tractor", 5)];

        let assignments = optimize_assignment_at(&machines, &tasks, today);
        assert_eq!(assignments.get("plow").map(String::as_str), Some("new"));
        assert!(
            (calculate_efficiency_at(&machines[2], &tasks[0], today) - 3.0).abs() < EPS
        );
    }

    #[test]
    fn higher_priority_task_wins_the_only_tractor() {
        let machines = vec![Machinery::with_id("m1", "T1", "Tractor")];
        let tasks = vec![Task::new("t1", "Tractor", 3), Task::new("t2", "Tractor", 4)];

        let assignments = optimize_assignment(&machines, &tasks);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments.get("t2").map(String::as_str), Some("m1"));
        assert!(!assignments.contains_key("t1"));
    }

    #[test]
    fn falls_back_to_any_type_when_none_match() {
        let today = d(2025, 6, 1);
        let machines = vec![
            Machinery::with_id("h1", "H1", "Harvester"),
            Machinery::with_id("s1", "S1", "Sprayer").maintained_on("2025-05-01"),
        ];
        let tasks = vec![Task::new("t1", "Tractor", 1)];

        let assignments = optimize_assignment_at(&machines, &tasks, today);
        assert_eq!(assignments.get("t1").map(String::as_str), Some("s1"));
    }

    #[test]
    fn equal_scores_keep_pool_order() {
        let machines = vec![
            Machinery::with_id("a", "A", "Tractor"),
            Machinery::with_id("b", "B", "Tractor"),
        ];
        let tasks = vec![Task::new("t1", "Tractor", 1)];
        let assignments = optimize_assignment(&machines, &tasks);
        assert_eq!(assignments.get("t1").map(String::as_str), Some("a"));
    }

    #[test]
    fn equal_priorities_keep_task_order() {
        let machines = vec![Machinery::with_id("m1", "T1", "Tractor")];
        let tasks = vec![Task::new("second", "Tractor", 2), Task::new("first", "Tractor", 2)];
        let assignments = optimize_assignment(&machines, &tasks);
        assert!(assignments.contains_key("second"));
        assert!(!assignments.contains_key("first"));
    }

    #[test]
    fn assignment_is_injective() {
        let machines = vec![
            Machinery::with_id("m1", "T1", "Tractor"),
            Machinery::with_id("m2", "H1", "Harvester"),
            Machinery::with_id("m3", "S1", "Sprayer"),
        ];
        let tasks: Vec<Task> = (0..6)
            .map(|i| Task::new(format!("t{i}"), "Tractor", i))
            .collect();
        let assignments = optimize_assignment(&machines, &tasks);
        assert_eq!(assignments.len(), 3);
        assert!(find_conflicts(&assignments).is_empty());
    }

    #[test]
    fn resolves_double_booked_machine_by_priority() {
        let assignments: AssignmentMap = [("t1", "m1"), ("t2", "m1"), ("t3", "m2")]
            .into_iter()
            .map(|(t, m)| (t.to_string(), m.to_string()))
            .collect();
        let priorities: HashMap<String, i32> = [("t1", 3), ("t2", 2), ("t3", 1)]
            .into_iter()
            .map(|(t, p)| (t.to_string(), p))
            .collect();

        let resolved = resolve_conflicts(&assignments, &priorities);
        let expected: AssignmentMap = [("t1", "m1"), ("t3", "m2")]
            .into_iter()
            .map(|(t, m)| (t.to_string(), m.to_string()))
            .collect();
        assert_eq!(resolved, expected);
        assert_eq!(resolve_conflicts(&resolved, &priorities), resolved);
    }

    #[test]
    fn missing_priorities_count_as_zero() {
        let assignments: AssignmentMap = [("a", "m1"), ("b", "m1"), ("c", "m1")]
            .into_iter()
            .map(|(t, m)| (t.to_string(), m.to_string()))
            .collect();
        let priorities: HashMap<String, i32> = [("c".to_string(), 1)].into_iter().collect();

        let resolved = resolve_conflicts(&assignments, &priorities);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("c").map(String::as_str), Some("m1"));

        let resolved = resolve_conflicts(&assignments, &HashMap::new());
        assert_eq!(resolved.keys().collect::<Vec<_>>(), vec!["a"]);
    }
}
