//! Store maintenance commands
//!
//! Usage:
//!   taskvault init
//!   taskvault status
//!   taskvault resync
//!   taskvault clear --yes

use super::CommandResult;
use clap::Args;
use taskvault_store::{PersistenceCoordinator, SchemaStatus, StoreConfig};

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of both artifacts
    #[arg(long)]
    pub yes: bool,
}

/// Run the schema guard and make sure a metadata document exists
pub fn execute_init(config: StoreConfig) -> CommandResult {
    let mut coordinator = PersistenceCoordinator::new(config);
    let status = coordinator.initialize()?;

    match &status {
        SchemaStatus::Current => println!("Content table is current"),
        SchemaStatus::Created => println!("Created content table"),
        SchemaStatus::Migrated { added } => {
            println!("Migrated content table (added: {})", added.join(", "))
        }
        SchemaStatus::Recreated { discarded_rows } => println!(
            "Recreated content table ({} stored rows discarded)",
            discarded_rows
        ),
    }

    if !coordinator.metadata().exists() {
        let written = coordinator.resync_metadata()?;
        println!("Wrote metadata document ({} entries)", written);
    }

    println!("✓ Store ready at {}", coordinator.config().data_dir.display());
    Ok(())
}

/// Report what is on disk without creating or repairing anything
pub fn execute_status(config: StoreConfig) -> CommandResult {
    let coordinator = PersistenceCoordinator::new(config);

    println!("Data directory: {}", coordinator.config().data_dir.display());
    println!(
        "Metadata document: {} ({})",
        coordinator.metadata().path().display(),
        presence(coordinator.metadata().exists())
    );
    println!(
        "Content store: {} ({})",
        coordinator.content().path().display(),
        presence(coordinator.content().exists())
    );

    if !coordinator.content().exists() {
        println!("Rows: 0");
        return Ok(());
    }

    if !coordinator.content().is_current() {
        println!("Content table: needs repair (run `taskvault init`)");
        return Ok(());
    }

    let report = coordinator.inspect_consistency()?;
    println!("Rows: {}", coordinator.content().count()?);

    if !coordinator.metadata().exists() {
        println!("Consistency: metadata document missing (run `taskvault resync`)");
    } else if report.is_consistent() {
        println!("Consistency: ok");
    } else {
        println!(
            "Consistency: diverged ({} metadata-only, {} content-only, {} unkeyed)",
            report.metadata_only.len(),
            report.content_only.len(),
            report.unkeyed_entries
        );
        for key in &report.metadata_only {
            println!("  metadata only: {}", key);
        }
        for key in &report.content_only {
            println!("  content only: {}", key);
        }
    }

    Ok(())
}

/// Rebuild the metadata document from content rows
pub fn execute_resync(config: StoreConfig) -> CommandResult {
    let mut coordinator = PersistenceCoordinator::new(config);
    let written = coordinator.resync_metadata()?;
    println!("✓ Wrote {} metadata entries", written);
    Ok(())
}

/// Delete both artifacts
pub fn execute_clear(config: StoreConfig, args: ClearArgs) -> CommandResult {
    if !args.yes {
        return Err("Refusing to clear the store without --yes".into());
    }

    let mut coordinator = PersistenceCoordinator::new(config);
    coordinator.clear_all()?;
    println!("✓ Cleared {}", coordinator.config().data_dir.display());
    Ok(())
}

fn presence(exists: bool) -> &'static str {
    if exists {
        "present"
    } else {
        "missing"
    }
}
