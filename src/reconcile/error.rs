//! Reconciliation error types.

use thiserror::Error;

use crate::client::ClientError;
use crate::error::{Effect, Transience};

/// Failures while reading observed state. Any of these aborts the run
/// before a single mutation is planned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DiscoveryError {
    #[error("discovery query against {table} failed: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("malformed row from {table}: expected {expected} tab-separated fields, got {got}")]
    MalformedRow {
        table: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("duplicate rows in {table} for key ({key})")]
    DuplicateKey { table: &'static str, key: String },

    #[error("row in {table} for key ({key}) vanished between discovery queries")]
    RowVanished { table: &'static str, key: String },
}

impl DiscoveryError {
    pub fn transience(&self) -> Transience {
        match self {
            DiscoveryError::Query { source, .. } => source.transience(),
            // Malformed output and duplicate keys mean the table itself needs
            // fixing; a vanished row points at a concurrent writer.
            DiscoveryError::MalformedRow { .. } | DiscoveryError::DuplicateKey { .. } => {
                Transience::Permanent
            }
            DiscoveryError::RowVanished { .. } => Transience::Retryable,
        }
    }

    pub fn effect(&self) -> Effect {
        // Discovery only reads.
        Effect::None
    }
}

/// The statement an entity mutation was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Create,
    Update,
    Delete,
}

impl MutationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationOp::Create => "create",
            MutationOp::Update => "update",
            MutationOp::Delete => "delete",
        }
    }
}

impl std::fmt::Display for MutationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entity's mutation failed. Reported per entity; sibling entities
/// in the same run keep going.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MutationError {
    #[error("{op} of {resource} `{id}` failed: {source}")]
    Statement {
        resource: &'static str,
        id: String,
        op: MutationOp,
        #[source]
        source: ClientError,
    },

    #[error("post-check after {op} of {resource} `{id}` failed: {source}")]
    Verify {
        resource: &'static str,
        id: String,
        op: MutationOp,
        #[source]
        source: ClientError,
    },

    #[error("created {resource} `{id}` but no row is visible in {table}")]
    CreateUnverified {
        resource: &'static str,
        id: String,
        table: &'static str,
    },

    #[error("deleted {resource} `{id}` but a row is still visible in {table}")]
    DeleteUnverified {
        resource: &'static str,
        id: String,
        table: &'static str,
    },
}

impl MutationError {
    pub fn transience(&self) -> Transience {
        match self {
            MutationError::Statement { source, .. } | MutationError::Verify { source, .. } => {
                source.transience()
            }
            MutationError::CreateUnverified { .. } | MutationError::DeleteUnverified { .. } => {
                Transience::Unknown
            }
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            MutationError::Statement { source, .. } => source.effect(),
            // The mutation statement itself completed before the post-check.
            MutationError::Verify { .. }
            | MutationError::CreateUnverified { .. }
            | MutationError::DeleteUnverified { .. } => Effect::Some,
        }
    }
}

/// A runtime-load or disk-save command failed. Staged mutations remain
/// applied; there is no rollback.
#[derive(Error, Debug)]
#[error("`{command}` failed: {source}")]
pub struct CommitError {
    pub command: &'static str,
    #[source]
    pub source: ClientError,
}

impl CommitError {
    pub fn transience(&self) -> Transience {
        self.source.transience()
    }

    pub fn effect(&self) -> Effect {
        Effect::Some
    }
}
