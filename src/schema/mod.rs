//! Static schemas for the managed configuration tables.
//!
//! A [`TableSchema`] carries everything the reconciler needs to know about
//! one staging table: identity columns, mutable fields with their defaults,
//! and the two commit commands that promote staged rows.

mod server;
mod user;

pub use server::SERVERS;
pub use user::USERS;

/// Validation class for a mutable field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 0/1 toggle.
    Flag,
    /// Non-negative integer.
    Unsigned,
    /// One of a fixed set of keywords.
    Keyword(&'static [&'static str]),
    /// Free-form text.
    Text,
}

impl FieldKind {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            FieldKind::Flag => matches!(value, "0" | "1"),
            FieldKind::Unsigned => {
                !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
            }
            FieldKind::Keyword(allowed) => allowed.contains(&value),
            FieldKind::Text => true,
        }
    }

    /// Human description used in validation errors.
    pub fn expected(&self) -> String {
        match self {
            FieldKind::Flag => "0 or 1".to_string(),
            FieldKind::Unsigned => "a non-negative integer".to_string(),
            FieldKind::Keyword(allowed) => format!("one of {}", allowed.join(", ")),
            FieldKind::Text => "text".to_string(),
        }
    }
}

/// One mutable (non-identity) column of a managed table.
#[derive(Debug)]
pub struct FieldSpec {
    pub column: &'static str,
    pub kind: FieldKind,
    /// Applied when the manifest omits the field. `None` means the field is
    /// left unmanaged unless declared.
    pub default: Option<&'static str>,
}

/// Static description of one managed configuration table.
#[derive(Debug)]
pub struct TableSchema {
    /// Singular resource name used in reports and errors.
    pub resource: &'static str,
    pub table: &'static str,
    /// Identity columns, in key order. Immutable once a row exists: a key
    /// change is a delete of the old row plus a create of the new one.
    pub key_columns: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    pub load_runtime_sql: &'static str,
    pub save_disk_sql: &'static str,
}

impl TableSchema {
    /// Key columns followed by every mutable column, in schema order.
    pub fn all_columns(&self) -> Vec<&'static str> {
        self.key_columns
            .iter()
            .copied()
            .chain(self.fields.iter().map(|f| f.column))
            .collect()
    }

    pub fn field(&self, column: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.column == column)
    }

    pub fn is_key_column(&self, column: &str) -> bool {
        self.key_columns.contains(&column)
    }
}
