//! Apply one planned mutation: exactly one statement, then a post-condition
//! check for creates and deletes.
//!
//! Verification queries the key back instead of trusting statement success,
//! which guards against statements that silently affect zero rows.

use crate::client::AdminClient;
use crate::manifest::ManagedEntity;
use crate::sql;

use super::error::{MutationError, MutationOp};
use super::planner::Plan;

pub fn apply(
    client: &dyn AdminClient,
    entity: &ManagedEntity,
    plan: &Plan,
) -> Result<(), MutationError> {
    let schema = entity.schema;
    match plan {
        Plan::Noop => Ok(()),

        Plan::Create { values } => {
            let stmt = sql::insert(schema.table, values);
            execute(client, entity, MutationOp::Create, &stmt)?;
            if !row_exists(client, entity, MutationOp::Create)? {
                return Err(MutationError::CreateUnverified {
                    resource: schema.resource,
                    id: entity.id(),
                    table: schema.table,
                });
            }
            tracing::info!(resource = schema.resource, id = entity.id(), "created");
            Ok(())
        }

        Plan::Update { dirty } => {
            let stmt = sql::update(
                schema.table,
                dirty.iter().map(|(c, v)| (*c, v)),
                schema.key_columns,
                &entity.key,
            );
            execute(client, entity, MutationOp::Update, &stmt)?;
            tracing::info!(
                resource = schema.resource,
                id = entity.id(),
                fields = dirty.len(),
                "updated"
            );
            Ok(())
        }

        Plan::Delete => {
            let stmt = sql::delete(schema.table, schema.key_columns, &entity.key);
            execute(client, entity, MutationOp::Delete, &stmt)?;
            if row_exists(client, entity, MutationOp::Delete)? {
                return Err(MutationError::DeleteUnverified {
                    resource: schema.resource,
                    id: entity.id(),
                    table: schema.table,
                });
            }
            tracing::info!(resource = schema.resource, id = entity.id(), "deleted");
            Ok(())
        }
    }
}

fn execute(
    client: &dyn AdminClient,
    entity: &ManagedEntity,
    op: MutationOp,
    stmt: &str,
) -> Result<String, MutationError> {
    client.execute(stmt).map_err(|source| MutationError::Statement {
        resource: entity.schema.resource,
        id: entity.id(),
        op,
        source,
    })
}

fn row_exists(
    client: &dyn AdminClient,
    entity: &ManagedEntity,
    op: MutationOp,
) -> Result<bool, MutationError> {
    let schema = entity.schema;
    let stmt = sql::select_where(
        schema.table,
        schema.key_columns,
        schema.key_columns,
        &entity.key,
    );
    let output = client.execute(&stmt).map_err(|source| MutationError::Verify {
        resource: schema.resource,
        id: entity.id(),
        op,
        source,
    })?;
    Ok(output.lines().any(|l| !l.is_empty()))
}
