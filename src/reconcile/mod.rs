//! The reconciliation engine.
//!
//! One run: discover observed state per table, pair every declared entity
//! with at most one observed record by identity key, plan the minimal
//! mutation, apply entity by entity, then promote the staging tables via the
//! runtime-load / disk-save commit commands.
//!
//! Runs are synchronous and single-writer: nothing here locks the backend,
//! so concurrent runs against the same tables race. A failed entity does not
//! stop its siblings; the report carries every outcome.

mod apply;
mod commit;
mod discover;
mod error;
mod matcher;
mod planner;
mod report;

pub use commit::CommitReport;
pub use discover::{discover, ObservedRecord};
pub use error::{CommitError, DiscoveryError, MutationError, MutationOp};
pub use matcher::ObservedIndex;
pub use planner::{plan, Plan};
pub use report::{Action, EntityOutcome, RunReport};

use crate::client::AdminClient;
use crate::manifest::ManagedEntity;
use crate::schema::TableSchema;

/// A planned-but-not-applied mutation, as produced by [`plan_only`].
#[derive(Debug)]
pub struct PlannedAction {
    pub resource: &'static str,
    pub id: String,
    pub plan: Plan,
}

/// Full reconciliation run over every declared entity.
///
/// Every table is discovered and indexed before the first mutation, so a
/// discovery failure anywhere aborts the whole run with nothing applied.
/// Mutation failures are per-entity and collected in the report; commit
/// failures likewise. The caller decides what a partial failure means for it.
pub fn run(
    client: &dyn AdminClient,
    entities: &[ManagedEntity],
) -> Result<RunReport, DiscoveryError> {
    let mut observed = Vec::new();
    for (schema, group) in group_by_schema(entities) {
        let index = ObservedIndex::build(schema, discover(client, schema)?)?;
        observed.push((schema, group, index));
    }

    let mut report = RunReport::default();
    for (schema, group, index) in observed {
        let mut applied_any = false;
        for entity in &group {
            let plan = planner::plan(entity, index.lookup(entity));
            let action = Action::from_plan(&plan);
            let error = match apply::apply(client, entity, &plan) {
                Ok(()) => {
                    if action != Action::None {
                        applied_any = true;
                    }
                    None
                }
                Err(e) => {
                    tracing::warn!(
                        resource = schema.resource,
                        id = entity.id(),
                        error = %e,
                        "entity reconciliation failed"
                    );
                    Some(e)
                }
            };
            report.outcomes.push(EntityOutcome {
                resource: schema.resource,
                id: entity.id(),
                action,
                error,
            });
        }

        // A converged table needs no promotion; skipping keeps an idempotent
        // run completely command-free.
        if applied_any {
            report.commits.push(commit::commit(client, schema, &group));
        }
    }

    Ok(report)
}

/// Discover and plan without applying anything.
pub fn plan_only(
    client: &dyn AdminClient,
    entities: &[ManagedEntity],
) -> Result<Vec<PlannedAction>, DiscoveryError> {
    let mut actions = Vec::with_capacity(entities.len());
    for (schema, group) in group_by_schema(entities) {
        let index = ObservedIndex::build(schema, discover(client, schema)?)?;
        for entity in group {
            actions.push(PlannedAction {
                resource: schema.resource,
                id: entity.id(),
                plan: planner::plan(entity, index.lookup(entity)),
            });
        }
    }
    Ok(actions)
}

/// Group entities by table, preserving first-appearance order of tables and
/// declaration order within each.
fn group_by_schema(
    entities: &[ManagedEntity],
) -> Vec<(&'static TableSchema, Vec<&ManagedEntity>)> {
    let mut groups: Vec<(&'static TableSchema, Vec<&ManagedEntity>)> = Vec::new();
    for entity in entities {
        match groups.iter_mut().find(|(s, _)| s.table == entity.schema.table) {
            Some((_, group)) => group.push(entity),
            None => groups.push((entity.schema, vec![entity])),
        }
    }
    groups
}
