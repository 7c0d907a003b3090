//! Declared desired state, loaded from a toml manifest.
//!
//! Entities are constructed fresh per reconciliation run: declared values are
//! validated against the table schema and merged over the schema defaults
//! before the backend is ever contacted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::{Effect, Transience};
use crate::schema::{FieldKind, TableSchema, SERVERS, USERS};

/// Desired existence of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{resource} `{id}`: unknown field `{field}`")]
    UnknownField {
        resource: &'static str,
        id: String,
        field: String,
    },

    #[error("{resource} `{id}`: field `{field}` must be {expected}, got `{value}`")]
    InvalidValue {
        resource: &'static str,
        id: String,
        field: String,
        value: String,
        expected: String,
    },

    #[error("{resource} `{id}` is declared more than once")]
    DuplicateEntity { resource: &'static str, id: String },
}

impl ManifestError {
    pub fn transience(&self) -> Transience {
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}

/// The declared resource set: `[[servers]]` and `[[users]]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub servers: Vec<ServerEntry>,
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub hostgroup_id: u32,
    #[serde(default)]
    pub ensure: Ensure,
    #[serde(default = "default_true")]
    pub load_to_runtime: bool,
    #[serde(default = "default_true")]
    pub save_to_disk: bool,
    /// Mutable columns, validated against the server schema.
    #[serde(flatten)]
    pub fields: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub username: String,
    #[serde(default)]
    pub ensure: Ensure,
    #[serde(default = "default_true")]
    pub load_to_runtime: bool,
    #[serde(default = "default_true")]
    pub save_to_disk: bool,
    /// Mutable columns, validated against the user schema.
    #[serde(flatten)]
    pub fields: BTreeMap<String, toml::Value>,
}

fn default_port() -> u16 {
    3306
}

fn default_true() -> bool {
    true
}

/// One declared resource, normalized for reconciliation.
#[derive(Debug, Clone)]
pub struct ManagedEntity {
    pub schema: &'static TableSchema,
    /// Values for `schema.key_columns`, in key order.
    pub key: Vec<String>,
    /// Desired non-identity attributes: declared values merged over schema
    /// defaults. Fields with no default that were not declared are absent
    /// here and stay unmanaged.
    pub attrs: BTreeMap<&'static str, String>,
    pub ensure: Ensure,
    pub load_to_runtime: bool,
    pub save_to_disk: bool,
}

impl ManagedEntity {
    /// Stable identity string: `hostname:port-hostgroup` for servers,
    /// the username for users.
    pub fn id(&self) -> String {
        match self.key.len() {
            3 => format!("{}:{}-{}", self.key[0], self.key[1], self.key[2]),
            _ => self.key.join(":"),
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validate and normalize every declaration. Fails before any backend
    /// contact on unknown fields, invalid values or duplicate identities.
    pub fn entities(&self) -> Result<Vec<ManagedEntity>, ManifestError> {
        let mut entities = Vec::with_capacity(self.servers.len() + self.users.len());
        for server in &self.servers {
            let key = vec![
                server.hostname.clone(),
                server.port.to_string(),
                server.hostgroup_id.to_string(),
            ];
            entities.push(build_entity(
                &SERVERS,
                key,
                &server.fields,
                server.ensure,
                server.load_to_runtime,
                server.save_to_disk,
            )?);
        }
        for user in &self.users {
            entities.push(build_entity(
                &USERS,
                vec![user.username.clone()],
                &user.fields,
                user.ensure,
                user.load_to_runtime,
                user.save_to_disk,
            )?);
        }
        reject_duplicates(&entities)?;
        Ok(entities)
    }
}

fn build_entity(
    schema: &'static TableSchema,
    key: Vec<String>,
    declared: &BTreeMap<String, toml::Value>,
    ensure: Ensure,
    load_to_runtime: bool,
    save_to_disk: bool,
) -> Result<ManagedEntity, ManifestError> {
    let entity = ManagedEntity {
        schema,
        key,
        attrs: BTreeMap::new(),
        ensure,
        load_to_runtime,
        save_to_disk,
    };

    let mut attrs: BTreeMap<&'static str, String> = schema
        .fields
        .iter()
        .filter_map(|f| f.default.map(|d| (f.column, d.to_string())))
        .collect();

    for (name, value) in declared {
        let Some(spec) = schema.field(name) else {
            return Err(ManifestError::UnknownField {
                resource: schema.resource,
                id: entity.id(),
                field: name.clone(),
            });
        };
        let text = scalar_to_string(spec.kind, value).ok_or_else(|| ManifestError::InvalidValue {
            resource: schema.resource,
            id: entity.id(),
            field: name.clone(),
            value: value.to_string(),
            expected: spec.kind.expected(),
        })?;
        if !spec.kind.accepts(&text) {
            return Err(ManifestError::InvalidValue {
                resource: schema.resource,
                id: entity.id(),
                field: name.clone(),
                value: text,
                expected: spec.kind.expected(),
            });
        }
        attrs.insert(spec.column, text);
    }

    Ok(ManagedEntity { attrs, ..entity })
}

fn scalar_to_string(kind: FieldKind, value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) if *i >= 0 => Some(i.to_string()),
        // `active = true` reads better than `active = 1`; only flag columns
        // take booleans.
        toml::Value::Boolean(b) if matches!(kind, FieldKind::Flag) => {
            Some(if *b { "1" } else { "0" }.to_string())
        }
        _ => None,
    }
}

fn reject_duplicates(entities: &[ManagedEntity]) -> Result<(), ManifestError> {
    let mut seen = BTreeSet::new();
    for entity in entities {
        if !seen.insert((entity.schema.table, entity.key.clone())) {
            return Err(ManifestError::DuplicateEntity {
                resource: entity.schema.resource,
                id: entity.id(),
            });
        }
    }
    Ok(())
}
