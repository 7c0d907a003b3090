//! Mutation Planner: pure diff of one declared entity against its matched
//! observed record.
//!
//! Planning only stages changes; nothing touches the backend until the plan
//! is applied. All dirty fields of one entity collapse into a single batched
//! update, never one statement per field.

use std::collections::BTreeMap;

use crate::manifest::{Ensure, ManagedEntity};

use super::discover::ObservedRecord;

/// The minimal mutation converging one entity, or proof none is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Insert a new row: identity columns plus the full desired attribute
    /// set (declared values already merged over schema defaults).
    Create { values: Vec<(&'static str, String)> },
    /// One batched UPDATE over exactly the fields that differ. Identity
    /// columns never appear here.
    Update { dirty: BTreeMap<&'static str, String> },
    /// Remove the row matching the identity key.
    Delete,
    /// Declared and observed state already agree.
    Noop,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        matches!(self, Plan::Noop)
    }
}

pub fn plan(entity: &ManagedEntity, observed: Option<&ObservedRecord>) -> Plan {
    match (entity.ensure, observed) {
        (Ensure::Present, None) => {
            let mut values: Vec<(&'static str, String)> = entity
                .schema
                .key_columns
                .iter()
                .copied()
                .zip(entity.key.iter().cloned())
                .collect();
            // Emit fields in schema order for stable statements.
            for spec in entity.schema.fields {
                if let Some(value) = entity.attrs.get(spec.column) {
                    values.push((spec.column, value.clone()));
                }
            }
            Plan::Create { values }
        }
        (Ensure::Present, Some(record)) => {
            let dirty: BTreeMap<&'static str, String> = entity
                .attrs
                .iter()
                .filter(|(column, desired)| record.attrs.get(*column) != Some(desired))
                .map(|(column, desired)| (*column, desired.clone()))
                .collect();
            if dirty.is_empty() {
                Plan::Noop
            } else {
                Plan::Update { dirty }
            }
        }
        (Ensure::Absent, Some(_)) => Plan::Delete,
        (Ensure::Absent, None) => Plan::Noop,
    }
}
