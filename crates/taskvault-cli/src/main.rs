//! TaskVault CLI
//!
//! Command-line interface for inspecting and maintaining persisted tasks

use clap::{Parser, Subcommand};
use taskvault_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "taskvault")]
#[command(about = "TaskVault - inspect and maintain persisted tasks", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: commands::StoreArgs,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or repair the content table
    Init,
    /// Show artifact presence, row count and consistency
    Status,
    /// List stored tasks
    List(commands::tasks::ListArgs),
    /// Mark a task completed
    Complete(commands::tasks::NameArgs),
    /// Mark a task pending again
    Reopen(commands::tasks::NameArgs),
    /// Delete a task
    Remove(commands::tasks::NameArgs),
    /// Rebuild the metadata document from the content table
    Resync,
    /// Delete both artifacts
    Clear(commands::store::ClearArgs),
}

fn main() {
    // A missing .env file is normal
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::CommandResult {
    let config = cli.store.resolve()?;

    match cli.command {
        Commands::Init => commands::store::execute_init(config),
        Commands::Status => commands::store::execute_status(config),
        Commands::List(args) => commands::tasks::execute_list(config, args),
        Commands::Complete(args) => commands::tasks::execute_complete(config, args),
        Commands::Reopen(args) => commands::tasks::execute_reopen(config, args),
        Commands::Remove(args) => commands::tasks::execute_remove(config, args),
        Commands::Resync => commands::store::execute_resync(config),
        Commands::Clear(args) => commands::store::execute_clear(config, args),
    }
}
