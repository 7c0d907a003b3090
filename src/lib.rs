#![forbid(unsafe_code)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod manifest;
pub mod reconcile;
pub mod schema;
pub mod sql;
pub mod telemetry;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the reconciliation surface at the crate root for convenience
pub use crate::client::{AdminClient, ClientError, MysqlCli};
pub use crate::manifest::{Ensure, ManagedEntity, Manifest};
pub use crate::reconcile::{
    Action, CommitReport, EntityOutcome, ObservedRecord, Plan, PlannedAction, RunReport,
};
pub use crate::schema::{TableSchema, SERVERS, USERS};
