use farm_manager::{
    AssignmentMap, FarmConfig, Inventory, InventoryStore, JsonInventoryStore, Machinery,
    Personnel, Resource, Task, UsageAction, UsageFilter, calculate_efficiency, find_conflicts,
    load_inventory_from_json, load_machinery_from_csv, logging, optimize_assignment,
    priorities_of, resolve_conflicts, save_inventory_to_json, save_machinery_to_csv,
};
#[cfg(feature = "sqlite")]
use farm_manager::SqliteInventoryStore;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

const COLUMNS: [&str; 8] = [
    "#",
    "id",
    "name",
    "category",
    "type",
    "status",
    "maintained",
    "purchased",
];

fn resource_row(idx: usize, resource: &Resource) -> Vec<String> {
    let (maintained, purchased) = match resource {
        Resource::Machinery(m) => (
            m.last_maintenance_date.clone().unwrap_or_default(),
            m.purchase_date.clone().unwrap_or_default(),
        ),
        Resource::Personnel(_) => (String::new(), String::new()),
    };
    vec![
        (idx + 1).to_string(),
        resource.id().to_string(),
        resource.name().to_string(),
        resource.category().as_str().to_string(),
        resource.kind().to_string(),
        resource.status().to_string(),
        maintained,
        purchased,
    ]
}

fn render_line(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.iter().enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_rows_as_text_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_line(&widths, header));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_line(&widths, &cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

/// Row numbers always refer to the full inventory so `#row` refs stay valid
/// for filtered listings.
fn render_resources<'a, I>(inventory: &Inventory, resources: I) -> String
where
    I: IntoIterator<Item = &'a Resource>,
{
    let rows: Vec<Vec<String>> = resources
        .into_iter()
        .map(|r| {
            let idx = inventory
                .resources()
                .iter()
                .position(|other| other.id() == r.id())
                .unwrap_or_default();
            resource_row(idx, r)
        })
        .collect();
    render_rows_as_text_table(&COLUMNS, &rows)
}

fn render_assignments(assignments: &AssignmentMap, inventory: &Inventory) -> String {
    let rows: Vec<Vec<String>> = assignments
        .iter()
        .map(|(task_id, resource_id)| {
            let name = inventory
                .get(resource_id)
                .map(|r| r.name().to_string())
                .unwrap_or_default();
            vec![task_id.clone(), resource_id.clone(), name]
        })
        .collect();
    render_rows_as_text_table(&["task", "resource", "name"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                                          Show this help\n  list [type]                                   List resources (optionally of one type/role)\n  available                                     List available resources\n  machinery add <name> <type> [purchase_date] [maintenance_date]\n                                                Register machinery (dates YYYY-MM-DD, '-' to skip)\n  personnel add <name> <role> <department> [skills_csv]\n                                                Register personnel\n  assign  <ref> <task> [location]               Assign a resource (ref is an id or #row)\n  release <ref>                                 Release a resource\n  maintain <ref>                                Record maintenance for machinery\n  report                                        Summarize the inventory\n  history [action]                              Show the usage log\n  task add <id> <type> <priority> [location]    Add a task to the work list\n  tasks                                         Show the work list\n  score <machine_ref> <task_id>                 Show machine efficiency for a task\n  optimize [apply]                              Assign available machinery to tasks\n  conflict <task_id> <resource_ref> [priority]  Add an entry to the draft assignment map\n  resolve                                       Resolve conflicts in the draft map\n  save <json|csv|dir|db> [path]                 Persist inventory (dir defaults to RESOURCE_DATA_PATH,\n                                                db to the DATABASE_URL sqlite file)\n  load <json|csv|dir|db> [path]                 Load inventory\n  quit|exit                                     Exit"
    );
}

/// Accepts a resource id or a 1-based `#row` from the listing.
fn resolve_ref(inventory: &Inventory, token: &str) -> Option<String> {
    if let Some(row) = token.strip_prefix('#') {
        let idx: usize = row.parse().ok()?;
        return inventory
            .resources()
            .get(idx.checked_sub(1)?)
            .map(|r| r.id().to_string());
    }
    inventory.get(token).map(|r| r.id().to_string())
}

fn optional_arg(value: Option<&str>) -> Option<String> {
    value.filter(|v| *v != "-").map(str::to_string)
}

fn target_path(config: &FarmConfig, format: &str, path: Option<&str>) -> Option<PathBuf> {
    match (format, path) {
        (_, Some(path)) => Some(PathBuf::from(path)),
        ("dir", None) => Some(config.resource_data_path.clone()),
        ("db", None) => config.sqlite_path(),
        _ => None,
    }
}

fn main() {
    let config = match FarmConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            FarmConfig::default()
        }
    };
    logging::init(&config.log_level);

    let mut inventory = Inventory::new();
    let mut tasks: Vec<Task> = Vec::new();
    let mut draft = AssignmentMap::new();
    let mut draft_priorities: HashMap<String, i32> = HashMap::new();

    println!("Farm Manager (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "list" => match parts.next() {
                Some(kind) => {
                    let matches = inventory.list_by_type(kind);
                    if matches.is_empty() {
                        println!("No resources of type '{kind}'.");
                    } else {
                        println!("{}", render_resources(&inventory, matches));
                    }
                }
                None => println!("{}", render_resources(&inventory, inventory.resources())),
            },
            "available" => println!("{}", render_resources(&inventory, inventory.list_available())),
            "machinery" => match (parts.next(), parts.next(), parts.next()) {
                (Some("add"), Some(name), Some(machine_type)) => {
                    let mut machine = Machinery::new(name, machine_type);
                    machine.purchase_date = optional_arg(parts.next());
                    machine.last_maintenance_date = optional_arg(parts.next());
                    match inventory.register_machinery(machine) {
                        Ok(m) => println!("Registered machinery {} ({}).", m.name, m.id),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!(
                    "Usage: machinery add <name> <type> [purchase_date] [maintenance_date]"
                ),
            },
            "personnel" => match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some("add"), Some(name), Some(role), Some(department)) => {
                    let skills: Vec<String> = parts
                        .next()
                        .map(|csv| {
                            csv.split(',')
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    let person = Personnel::new(name, role, department).with_skills(skills);
                    match inventory.register_personnel(person) {
                        Ok(p) => println!("Registered personnel {} ({}).", p.name, p.id),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: personnel add <name> <role> <department> [skills_csv]"),
            },
            "assign" | "release" | "maintain" => {
                let Some(token) = parts.next() else {
                    println!("Usage: {cmd} <ref>");
                    continue;
                };
                let Some(id) = resolve_ref(&inventory, token) else {
                    println!("Resource {token} not found.");
                    continue;
                };
                let is_machinery = inventory.get_machinery(&id).is_some();
                let result = match (cmd, is_machinery) {
                    ("assign", _) => {
                        let Some(task) = parts.next() else {
                            println!("Usage: assign <ref> <task> [location]");
                            continue;
                        };
                        let location = parts.collect::<Vec<_>>().join(" ");
                        let location = (!location.is_empty()).then_some(location);
                        if is_machinery {
                            inventory.assign_machinery(&id, task, location.as_deref())
                        } else {
                            inventory.assign_personnel(&id, task, location.as_deref())
                        }
                    }
                    ("release", true) => inventory.release_machinery(&id),
                    ("release", false) => inventory.release_personnel(&id),
                    (_, true) => inventory.record_maintenance(&id),
                    (_, false) => {
                        println!("Maintenance applies to machinery only.");
                        continue;
                    }
                };
                match result {
                    Ok(true) => println!("{cmd} ok for {id}."),
                    Ok(false) => {
                        println!("{cmd} refused: resource {id} is not in the right state.")
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "report" => println!("{}", inventory.report().to_cli_summary()),
            "history" => {
                let mut filter = UsageFilter::default();
                if let Some(raw) = parts.next() {
                    match raw.parse::<UsageAction>() {
                        Ok(action) => filter.action = Some(action),
                        Err(_) => {
                            println!("Unknown action '{raw}'.");
                            continue;
                        }
                    }
                }
                for entry in inventory.usage_history(&filter) {
                    println!(
                        "{} {:<12} {:<10} {} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.action.as_str(),
                        entry.resource_category.as_str(),
                        entry.resource_name,
                        entry
                            .details
                            .as_deref()
                            .or(entry.task.as_deref())
                            .unwrap_or_default()
                    );
                }
            }
            "task" => match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some("add"), Some(id), Some(task_type), Some(priority_s)) => {
                    let priority: i32 = match priority_s.parse() {
                        Ok(v) => v,
                        Err(_) => {
                            println!("Invalid priority");
                            continue;
                        }
                    };
                    let location = parts.collect::<Vec<_>>().join(" ");
                    let mut task = Task::new(id, task_type, priority);
                    if !location.is_empty() {
                        task = task.at(location);
                    }
                    tasks.retain(|t| t.id != task.id);
                    tasks.push(task);
                    println!("Task {id} added.");
                }
                _ => println!("Usage: task add <id> <type> <priority> [location]"),
            },
            "tasks" => {
                let rows: Vec<Vec<String>> = tasks
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.clone(),
                            t.task_type.clone(),
                            t.priority.to_string(),
                            t.location.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    render_rows_as_text_table(&["id", "type", "priority", "location"], &rows)
                );
            }
            "score" => {
                let (Some(token), Some(task_id)) = (parts.next(), parts.next()) else {
                    println!("Usage: score <machine_ref> <task_id>");
                    continue;
                };
                let machine = resolve_ref(&inventory, token)
                    .and_then(|id| inventory.get_machinery(&id).cloned());
                let task = tasks.iter().find(|t| t.id == task_id);
                match (machine, task) {
                    (Some(machine), Some(task)) => println!(
                        "Efficiency of {} for {}: {:.3}",
                        machine.name,
                        task.id,
                        calculate_efficiency(&machine, task)
                    ),
                    (None, _) => println!("Machinery {token} not found."),
                    (_, None) => println!("Task {task_id} not found."),
                }
            }
            "optimize" => {
                let apply = parts.next() == Some("apply");
                let available = inventory.available_machinery();
                let assignments = optimize_assignment(&available, &tasks);
                println!("Optimized ({} of {} tasks assigned)", assignments.len(), tasks.len());
                println!("{}", render_assignments(&assignments, &inventory));
                for task in tasks.iter().filter(|t| !assignments.contains_key(&t.id)) {
                    println!("Unassigned: {}", task.id);
                }
                if apply {
                    let rejected = inventory.apply_assignments(&assignments, &tasks);
                    println!(
                        "Applied {} assignment(s).",
                        assignments.len() - rejected.len()
                    );
                }
            }
            "conflict" => {
                let (Some(task_id), Some(token)) = (parts.next(), parts.next()) else {
                    println!("Usage: conflict <task_id> <resource_ref> [priority]");
                    continue;
                };
                let resource_id =
                    resolve_ref(&inventory, token).unwrap_or_else(|| token.to_string());
                if let Some(priority_s) = parts.next() {
                    match priority_s.parse::<i32>() {
                        Ok(p) => {
                            draft_priorities.insert(task_id.to_string(), p);
                        }
                        Err(_) => {
                            println!("Invalid priority");
                            continue;
                        }
                    }
                }
                draft.insert(task_id.to_string(), resource_id);
                println!(
                    "Draft has {} entries, {} double-booked resource(s).",
                    draft.len(),
                    find_conflicts(&draft).len()
                );
            }
            "resolve" => {
                let mut priorities = priorities_of(&tasks);
                priorities.extend(draft_priorities.clone());
                draft = resolve_conflicts(&draft, &priorities);
                println!("Resolved draft:");
                println!("{}", render_assignments(&draft, &inventory));
            }
            "save" | "load" => {
                let Some(format) = parts.next() else {
                    println!("Usage: {cmd} <json|csv|dir|db> [path]");
                    continue;
                };
                let Some(path) = target_path(&config, format, parts.next()) else {
                    println!("Usage: {cmd} <json|csv|dir|db> [path]");
                    continue;
                };
                let display = path.display().to_string();
                match (cmd, format) {
                    ("save", "json") => match save_inventory_to_json(&inventory, &path) {
                        Ok(_) => println!("Inventory saved to {display}."),
                        Err(e) => println!("Save error: {e}"),
                    },
                    ("save", "csv") => match save_machinery_to_csv(&inventory, &path) {
                        Ok(_) => println!("Machinery saved to {display}."),
                        Err(e) => println!("Save error: {e}"),
                    },
                    ("save", "dir") => {
                        let result = JsonInventoryStore::new(&path)
                            .and_then(|store| store.save_inventory(&inventory));
                        match result {
                            Ok(_) => println!("Inventory saved to {display}."),
                            Err(e) => println!("Save error: {e}"),
                        }
                    }
                    ("load", "json") => match load_inventory_from_json(&path) {
                        Ok(loaded) => {
                            inventory = loaded;
                            println!("Inventory loaded from {display}.");
                            println!("{}", render_resources(&inventory, inventory.resources()));
                        }
                        Err(e) => println!("Load error: {e}"),
                    },
                    ("load", "csv") => {
                        let personnel: Vec<Personnel> = inventory.personnel().cloned().collect();
                        let result = load_machinery_from_csv(&path).and_then(|machinery| {
                            Ok(Inventory::from_parts(
                                machinery,
                                personnel,
                                inventory.usage_log().to_vec(),
                            )?)
                        });
                        match result {
                            Ok(loaded) => {
                                inventory = loaded;
                                println!("Machinery loaded from {display}.");
                                let rows = render_resources(&inventory, inventory.resources());
                                println!("{rows}");
                            }
                            Err(e) => println!("Load error: {e}"),
                        }
                    }
                    ("load", "dir") => {
                        let result = JsonInventoryStore::new(&path)
                            .and_then(|store| store.load_inventory());
                        match result {
                            Ok(Some(loaded)) => {
                                inventory = loaded;
                                println!("Inventory loaded from {display}.");
                                let rows = render_resources(&inventory, inventory.resources());
                                println!("{rows}");
                            }
                            Ok(None) => println!("No inventory stored in {display}."),
                            Err(e) => println!("Load error: {e}"),
                        }
                    }
                    #[cfg(feature = "sqlite")]
                    ("save", "db") => {
                        let result = SqliteInventoryStore::new(&path)
                            .and_then(|store| store.save_inventory(&inventory));
                        match result {
                            Ok(_) => println!("Inventory saved to {display}."),
                            Err(e) => println!("Save error: {e}"),
                        }
                    }
                    #[cfg(feature = "sqlite")]
                    ("load", "db") => {
                        let result = SqliteInventoryStore::new(&path)
                            .and_then(|store| store.load_inventory());
                        match result {
                            Ok(Some(loaded)) => {
                                inventory = loaded;
                                println!("Inventory loaded from {display}.");
                                let rows = render_resources(&inventory, inventory.resources());
                                println!("{rows}");
                            }
                            Ok(None) => println!("No inventory stored in {display}."),
                            Err(e) => println!("Load error: {e}"),
                        }
                    }
                    _ => println!("Unknown format '{format}' (json|csv|dir|db)"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
