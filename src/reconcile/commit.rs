//! Commit Coordinator: promote the staging table to runtime and disk.
//!
//! Per table, the union of the run's flags decides which commands run, each
//! at most once. Runtime-load goes first so the persisted image matches what
//! is actually active. Both commands are idempotent on the backend side.

use crate::client::AdminClient;
use crate::manifest::ManagedEntity;
use crate::schema::TableSchema;

use super::error::CommitError;

/// What the coordinator did for one table.
#[derive(Debug)]
pub struct CommitReport {
    pub resource: &'static str,
    pub loaded_runtime: bool,
    pub saved_disk: bool,
    pub errors: Vec<CommitError>,
}

impl CommitReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn commit(
    client: &dyn AdminClient,
    schema: &'static TableSchema,
    entities: &[&ManagedEntity],
) -> CommitReport {
    let load = entities.iter().any(|e| e.load_to_runtime);
    let save = entities.iter().any(|e| e.save_to_disk);

    let mut report = CommitReport {
        resource: schema.resource,
        loaded_runtime: false,
        saved_disk: false,
        errors: Vec::new(),
    };

    if load {
        match run_command(client, schema.load_runtime_sql) {
            Ok(()) => report.loaded_runtime = true,
            Err(e) => report.errors.push(e),
        }
    }
    // Disk-save is independent of runtime-load; a failed load does not stop
    // the save, it is just reported alongside.
    if save {
        match run_command(client, schema.save_disk_sql) {
            Ok(()) => report.saved_disk = true,
            Err(e) => report.errors.push(e),
        }
    }

    report
}

fn run_command(client: &dyn AdminClient, command: &'static str) -> Result<(), CommitError> {
    tracing::info!(command, "commit");
    client
        .execute(command)
        .map(|_| ())
        .map_err(|source| CommitError { command, source })
}
