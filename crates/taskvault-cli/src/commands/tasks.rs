//! Task commands
//!
//! Usage:
//!   taskvault list [--pending | --completed] [--long]
//!   taskvault complete <NAME>
//!   taskvault reopen <NAME>
//!   taskvault remove <NAME>

use super::CommandResult;
use clap::Args;
use taskvault_core::model::format_timestamp;
use taskvault_core::{derive_key, Task};
use taskvault_store::{LoadOutcome, PersistenceCoordinator, StoreConfig};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only tasks not yet completed
    #[arg(long, conflicts_with = "completed")]
    pub pending: bool,

    /// Only completed tasks
    #[arg(long)]
    pub completed: bool,

    /// Print every field, variant fields included
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Args)]
pub struct NameArgs {
    /// Task name (case-insensitive)
    pub name: String,
}

/// Print stored tasks in stored order
pub fn execute_list(config: StoreConfig, args: ListArgs) -> CommandResult {
    let mut coordinator = PersistenceCoordinator::new(config);
    let tasks = load(&mut coordinator)?;

    let shown: Vec<&Task> = tasks
        .iter()
        .filter(|t| !(args.pending && t.is_completed) && !(args.completed && !t.is_completed))
        .collect();

    if shown.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    for task in shown {
        if args.long {
            println!("{}", task);
            println!();
        } else {
            println!(
                "[{}] {} ({}, due {})",
                if task.is_completed { "x" } else { " " },
                task.name,
                task.kind(),
                format_timestamp(&task.due_date)
            );
        }
    }
    Ok(())
}

pub fn execute_complete(config: StoreConfig, args: NameArgs) -> CommandResult {
    set_completed(config, &args.name, true)
}

pub fn execute_reopen(config: StoreConfig, args: NameArgs) -> CommandResult {
    set_completed(config, &args.name, false)
}

/// Delete the task with this name
pub fn execute_remove(config: StoreConfig, args: NameArgs) -> CommandResult {
    let mut coordinator = PersistenceCoordinator::new(config);
    let tasks = load(&mut coordinator)?;
    let task = find_by_name(&tasks, &args.name)?;

    if !coordinator.remove_one(task)? {
        return Err(format!("Task '{}' is no longer stored", task.name).into());
    }
    println!("✓ Removed {} ({})", task.name, derive_key(task));
    Ok(())
}

fn set_completed(config: StoreConfig, name: &str, completed: bool) -> CommandResult {
    let mut coordinator = PersistenceCoordinator::new(config);
    let tasks = load(&mut coordinator)?;
    let mut task = find_by_name(&tasks, name)?.clone();

    if task.is_completed == completed {
        println!(
            "{} is already {}",
            task.name,
            if completed { "completed" } else { "pending" }
        );
        return Ok(());
    }

    if completed {
        task.mark_completed();
    } else {
        task.mark_pending();
    }

    if !coordinator.update_one(&task)? {
        return Err(format!("Task '{}' is no longer stored", task.name).into());
    }
    println!(
        "✓ {} {}",
        if completed { "Completed" } else { "Reopened" },
        task.name
    );
    Ok(())
}

/// Load everything, reporting skipped rows on stderr
fn load(
    coordinator: &mut PersistenceCoordinator,
) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let outcome = coordinator.load_all();

    if let LoadOutcome::Partial { skipped, .. } = &outcome {
        eprintln!("Warning: {} stored rows could not be read", skipped.len());
        for row in skipped {
            eprintln!("  {}", row.error);
        }
    }

    Ok(outcome.into_result()?)
}

/// The single task whose name matches, ignoring case
fn find_by_name<'a>(
    tasks: &'a [Task],
    name: &str,
) -> Result<&'a Task, Box<dyn std::error::Error>> {
    let wanted = name.to_lowercase();
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.name.to_lowercase() == wanted)
        .collect();

    match matches.as_slice() {
        [] => Err(format!("No task named '{}'", name).into()),
        [task] => Ok(*task),
        many => {
            let keys: Vec<String> = many.iter().copied().map(derive_key).collect();
            Err(format!(
                "{} tasks are named '{}': {}",
                many.len(),
                name,
                keys.join(", ")
            )
            .into())
        }
    }
}
