//! `mysql_users` staging table.

use super::{FieldKind, FieldSpec, TableSchema};

pub const USERS: TableSchema = TableSchema {
    resource: "user",
    table: "mysql_users",
    key_columns: &["username"],
    fields: &[
        // No default: a password is only managed when declared.
        FieldSpec {
            column: "password",
            kind: FieldKind::Text,
            default: None,
        },
        FieldSpec {
            column: "active",
            kind: FieldKind::Flag,
            default: Some("1"),
        },
        FieldSpec {
            column: "use_ssl",
            kind: FieldKind::Flag,
            default: Some("0"),
        },
        FieldSpec {
            column: "default_hostgroup",
            kind: FieldKind::Unsigned,
            default: Some("0"),
        },
        FieldSpec {
            column: "default_schema",
            kind: FieldKind::Text,
            default: None,
        },
        FieldSpec {
            column: "schema_locked",
            kind: FieldKind::Flag,
            default: Some("0"),
        },
        FieldSpec {
            column: "transaction_persistent",
            kind: FieldKind::Flag,
            default: Some("0"),
        },
        FieldSpec {
            column: "fast_forward",
            kind: FieldKind::Flag,
            default: Some("0"),
        },
        FieldSpec {
            column: "backend",
            kind: FieldKind::Flag,
            default: Some("1"),
        },
        FieldSpec {
            column: "frontend",
            kind: FieldKind::Flag,
            default: Some("1"),
        },
        FieldSpec {
            column: "max_connections",
            kind: FieldKind::Unsigned,
            default: Some("10000"),
        },
    ],
    load_runtime_sql: "LOAD MYSQL USERS TO RUNTIME",
    save_disk_sql: "SAVE MYSQL USERS TO DISK",
};
