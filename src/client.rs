//! Synchronous transport to the proxy's admin interface.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

use crate::config::Config;
use crate::error::{Effect, Transience};

/// Errors from the admin transport.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend rejected statement (exit {status}): {stderr}")]
    Rejected { status: i32, stderr: String },

    #[error("backend produced non-utf8 output")]
    Output(#[from] std::string::FromUtf8Error),
}

impl ClientError {
    pub fn transience(&self) -> Transience {
        match self {
            // A missing or broken client binary will not fix itself.
            ClientError::Spawn { .. } => Transience::Permanent,
            // Rejection covers both syntax errors and connection failures;
            // the admin interface does not let us tell them apart.
            ClientError::Rejected { .. } => Transience::Unknown,
            ClientError::Output(_) => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            ClientError::Spawn { .. } => Effect::None,
            ClientError::Rejected { .. } => Effect::Unknown,
            // The statement ran; only the output was unreadable.
            ClientError::Output(_) => Effect::Unknown,
        }
    }
}

/// Synchronous command-style interface to the admin port.
///
/// `execute` blocks until the statement completes. Success returns
/// newline-separated rows with tab-separated columns and no header row,
/// values already backend-formatted.
pub trait AdminClient {
    fn execute(&self, sql: &str) -> Result<String, ClientError>;
}

/// Production client: shells out to the `mysql` binary against the admin
/// interface, credentials supplied via a my.cnf-style defaults file.
#[derive(Debug, Clone)]
pub struct MysqlCli {
    binary: PathBuf,
    defaults_file: Option<PathBuf>,
}

impl MysqlCli {
    pub fn new(binary: PathBuf, defaults_file: Option<PathBuf>) -> Self {
        Self {
            binary,
            defaults_file,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.mysql_binary.clone(), config.defaults_file.clone())
    }
}

impl AdminClient for MysqlCli {
    fn execute(&self, sql: &str) -> Result<String, ClientError> {
        let mut cmd = Command::new(&self.binary);
        // --defaults-extra-file must precede every other argument.
        if let Some(path) = &self.defaults_file {
            cmd.arg(format!("--defaults-extra-file={}", path.display()));
        }
        cmd.arg("-NB").arg("-e").arg(sql);

        tracing::debug!(statement = sql, "admin statement");
        let output = cmd.output().map_err(|source| ClientError::Spawn {
            binary: self.binary.display().to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(ClientError::Rejected {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
