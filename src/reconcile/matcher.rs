//! Identity Matcher: pair declared entities with observed records.
//!
//! An explicit index from key tuple to record, built once per table per run.
//! Declared entities that miss the index are treated as not-yet-existing.

use std::collections::BTreeMap;

use crate::manifest::ManagedEntity;
use crate::schema::TableSchema;

use super::discover::ObservedRecord;
use super::error::DiscoveryError;

#[derive(Debug, Default)]
pub struct ObservedIndex {
    by_key: BTreeMap<Vec<String>, ObservedRecord>,
}

impl ObservedIndex {
    /// Index records by identity key. Two records with the same key are a
    /// backend integrity violation and fail the build.
    pub fn build(
        schema: &'static TableSchema,
        records: Vec<ObservedRecord>,
    ) -> Result<Self, DiscoveryError> {
        let mut by_key = BTreeMap::new();
        for record in records {
            let key = record.key.clone();
            if by_key.insert(key.clone(), record).is_some() {
                return Err(DiscoveryError::DuplicateKey {
                    table: schema.table,
                    key: key.join(", "),
                });
            }
        }
        Ok(Self { by_key })
    }

    pub fn lookup(&self, entity: &ManagedEntity) -> Option<&ObservedRecord> {
        self.by_key.get(&entity.key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
