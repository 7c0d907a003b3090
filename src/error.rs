use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::manifest::ManifestError;
use crate::reconcile::{CommitError, DiscoveryError, MutationError};

/// Whether retrying this operation may succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// Retry will never help without changing inputs/state.
    Permanent,
    /// Retry may help (transient contention/outage).
    Retryable,
    /// Unknown if retry will help.
    Unknown,
}

impl Transience {
    pub fn is_retryable(self) -> bool {
        matches!(self, Transience::Retryable)
    }
}

/// What we know about side effects when an error is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Effect {
    /// Definitely no side effects occurred.
    None,
    /// Side effects definitely occurred on the backend.
    Some,
    /// We don't know if side effects occurred.
    Unknown,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Some => "some",
            Effect::Unknown => "unknown",
        }
    }
}

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over the per-phase errors of a
/// reconciliation run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    /// The run finished but one or more entities failed to reconcile.
    #[error("reconciliation finished with {failed} of {total} entities failed")]
    PartialFailure { failed: usize, total: usize },
}

impl Error {
    pub fn transience(&self) -> Transience {
        match self {
            Error::Config(e) => e.transience(),
            Error::Manifest(e) => e.transience(),
            Error::Client(e) => e.transience(),
            Error::Discovery(e) => e.transience(),
            Error::Mutation(e) => e.transience(),
            Error::Commit(e) => e.transience(),
            Error::PartialFailure { .. } => Transience::Unknown,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            Error::Config(e) => e.effect(),
            Error::Manifest(e) => e.effect(),
            Error::Client(e) => e.effect(),
            Error::Discovery(e) => e.effect(),
            Error::Mutation(e) => e.effect(),
            Error::Commit(e) => e.effect(),
            // Staged mutations from the successful entities remain applied.
            Error::PartialFailure { .. } => Effect::Some,
        }
    }
}
