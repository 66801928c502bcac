use chrono::{Duration, NaiveDate};
use farm_manager::{
    AssignmentMap, Inventory, Machinery, ResourceStatus, Task, calculate_efficiency_at,
    find_conflicts, logging, optimize_assignment_at, priorities_of, resolve_conflicts,
};
use std::collections::HashSet;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn days_ago(days: i64) -> String {
    (today() - Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn fleet() -> Inventory {
    logging::init_test();
    let mut inventory = Inventory::new();
    let maintained = format!("{}T07:00:00", days_ago(0));
    for machine in [
        Machinery::with_id("m1", "Tractor 1", "Tractor")
            .purchased_on(days_ago(365))
            .maintained_on(maintained.clone()),
        Machinery::with_id("m2", "Tractor 2", "Tractor").purchased_on(days_ago(730)),
        Machinery::with_id("m3", "Harvester", "Harvester")
            .purchased_on(days_ago(180))
            .maintained_on(maintained),
        Machinery::with_id("m4", "Sprayer", "Sprayer").purchased_on(days_ago(90)),
    ] {
        inventory.register_machinery(machine).unwrap();
    }
    inventory
}

fn field_tasks() -> Vec<Task> {
    vec![
        Task::new("task1", "Tractor", 3).named("Plowing Field A").at("Field A"),
        Task::new("task2", "Harvester", 2).named("Harvesting Field B").at("Field B"),
        Task::new("task3", "Sprayer", 1).named("Spraying Field C").at("Field C"),
        Task::new("task4", "Tractor", 4).named("Plowing Field D").at("Field D"),
    ]
}

#[test]
fn maintained_machine_outscores_its_unmaintained_twin() {
    let inventory = fleet();
    let task = Task::new("t", "Tractor", 1);
    let m1 = inventory.get_machinery("m1").unwrap();
    let m2 = inventory.get_machinery("m2").unwrap();

    let s1 = calculate_efficiency_at(m1, &task, today());
    let s2 = calculate_efficiency_at(m2, &task, today());
    assert!((s1 - 2.0).abs() < 1e-9, "got {s1}");
    assert!((s2 - 1.5).abs() < 1e-9, "got {s2}");
    assert!(s1 > s2);
}

#[test]
fn every_task_gets_a_machine_of_its_type() {
    let mut inventory = fleet();
    let tasks = field_tasks();
    let available = inventory.available_machinery();
    let assignments = optimize_assignment_at(&available, &tasks, today());

    assert_eq!(assignments.len(), 4);
    assert_eq!(assignments["task4"], "m1");
    assert_eq!(assignments["task1"], "m2");
    assert_eq!(assignments["task2"], "m3");
    assert_eq!(assignments["task3"], "m4");
    for (task_id, machine_id) in &assignments {
        let task = tasks.iter().find(|t| &t.id == task_id).unwrap();
        let machine = inventory.get_machinery(machine_id).unwrap();
        assert_eq!(machine.machine_type, task.task_type);
    }

    let machines: HashSet<&String> = assignments.values().collect();
    assert_eq!(machines.len(), assignments.len());

    assert!(inventory.apply_assignments(&assignments, &tasks).is_empty());
    assert!(
        inventory
            .machinery()
            .all(|m| m.status == ResourceStatus::InUse)
    );
}

#[test]
fn busy_machines_are_left_out_of_the_pool() {
    let mut inventory = fleet();
    inventory.assign_machinery("m1", "Hauling", None).unwrap();
    let tasks = field_tasks();
    let assignments = optimize_assignment_at(&inventory.available_machinery(), &tasks, today());

    assert_eq!(assignments["task4"], "m2");
    // task1 falls back to the best remaining machine of any type
    assert!(assignments.contains_key("task1"));
    assert!(!assignments.values().any(|m| m == "m1"));
    assert_eq!(assignments.len(), 3);
}

#[test]
fn conflicting_draft_keeps_highest_priority_per_machine() {
    let tasks = vec![
        Task::new("task1", "Tractor", 3),
        Task::new("task2", "Tractor", 2),
        Task::new("task3", "Tractor", 1),
    ];
    let draft: AssignmentMap = [("task1", "m1"), ("task2", "m1"), ("task3", "m2")]
        .into_iter()
        .map(|(t, m)| (t.to_string(), m.to_string()))
        .collect();

    assert_eq!(find_conflicts(&draft).len(), 1);

    let resolved = resolve_conflicts(&draft, &priorities_of(&tasks));
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved["task1"], "m1");
    assert_eq!(resolved["task3"], "m2");
    assert!(find_conflicts(&resolved).is_empty());
}
