//! State Reader: build the observed set for one managed table.
//!
//! Two-pass read: a key-projection query first, then one full-column query
//! per row filtered on the exact key values. The second pass keeps optional
//! text columns (comments, passwords) from corrupting the row shape of one
//! giant result set; the cost is round-trips, the gain is per-row
//! correctness.

use std::collections::BTreeMap;

use crate::client::AdminClient;
use crate::schema::TableSchema;
use crate::sql;

use super::error::DiscoveryError;

/// One fully-expanded backend row. Constructed only by discovery, discarded
/// at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRecord {
    /// Values for the schema's key columns, in key order.
    pub key: Vec<String>,
    /// Every mutable column, always fully present: the backend returns
    /// defaulted values for columns that were never set explicitly.
    pub attrs: BTreeMap<&'static str, String>,
}

pub fn discover(
    client: &dyn AdminClient,
    schema: &'static TableSchema,
) -> Result<Vec<ObservedRecord>, DiscoveryError> {
    let projection = sql::select_all(schema.table, schema.key_columns);
    let output = run_query(client, schema, &projection)?;

    let mut records = Vec::new();
    for line in output.lines().filter(|l| !l.is_empty()) {
        let key = split_row(schema, line, schema.key_columns.len())?;
        records.push(fetch_record(client, schema, key)?);
    }
    tracing::debug!(
        table = schema.table,
        rows = records.len(),
        "discovered observed state"
    );
    Ok(records)
}

fn fetch_record(
    client: &dyn AdminClient,
    schema: &'static TableSchema,
    key: Vec<String>,
) -> Result<ObservedRecord, DiscoveryError> {
    let columns = schema.all_columns();
    let stmt = sql::select_where(schema.table, &columns, schema.key_columns, &key);
    let output = run_query(client, schema, &stmt)?;

    let mut rows = output.lines().filter(|l| !l.is_empty());
    let Some(row) = rows.next() else {
        return Err(DiscoveryError::RowVanished {
            table: schema.table,
            key: key.join(", "),
        });
    };
    if rows.next().is_some() {
        // The natural key is supposed to be unique; duplicates mean the
        // table was edited by hand. Matching against them would be
        // nondeterministic, so refuse the whole run.
        return Err(DiscoveryError::DuplicateKey {
            table: schema.table,
            key: key.join(", "),
        });
    }

    let values = split_row(schema, row, columns.len())?;
    let attrs = schema
        .fields
        .iter()
        .zip(values.iter().skip(schema.key_columns.len()))
        .map(|(spec, value)| (spec.column, value.clone()))
        .collect();
    Ok(ObservedRecord { key, attrs })
}

fn run_query(
    client: &dyn AdminClient,
    schema: &'static TableSchema,
    stmt: &str,
) -> Result<String, DiscoveryError> {
    client.execute(stmt).map_err(|source| DiscoveryError::Query {
        table: schema.table,
        source,
    })
}

fn split_row(
    schema: &'static TableSchema,
    line: &str,
    expected: usize,
) -> Result<Vec<String>, DiscoveryError> {
    let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
    if fields.len() != expected {
        return Err(DiscoveryError::MalformedRow {
            table: schema.table,
            expected,
            got: fields.len(),
        });
    }
    Ok(fields)
}
