//! `mysql_servers` staging table.

use super::{FieldKind, FieldSpec, TableSchema};

pub const SERVERS: TableSchema = TableSchema {
    resource: "server",
    table: "mysql_servers",
    key_columns: &["hostname", "port", "hostgroup_id"],
    fields: &[
        FieldSpec {
            column: "status",
            kind: FieldKind::Keyword(&["ONLINE", "OFFLINE_SOFT", "OFFLINE_HARD", "SHUNNED"]),
            default: Some("ONLINE"),
        },
        FieldSpec {
            column: "weight",
            kind: FieldKind::Unsigned,
            default: Some("1"),
        },
        FieldSpec {
            column: "compression",
            kind: FieldKind::Unsigned,
            default: Some("0"),
        },
        FieldSpec {
            column: "max_connections",
            kind: FieldKind::Unsigned,
            default: Some("1000"),
        },
        FieldSpec {
            column: "max_replication_lag",
            kind: FieldKind::Unsigned,
            default: Some("0"),
        },
        FieldSpec {
            column: "use_ssl",
            kind: FieldKind::Flag,
            default: Some("0"),
        },
        FieldSpec {
            column: "max_latency_ms",
            kind: FieldKind::Unsigned,
            default: Some("0"),
        },
        FieldSpec {
            column: "comment",
            kind: FieldKind::Text,
            default: Some(""),
        },
    ],
    load_runtime_sql: "LOAD MYSQL SERVERS TO RUNTIME",
    save_disk_sql: "SAVE MYSQL SERVERS TO DISK",
};
