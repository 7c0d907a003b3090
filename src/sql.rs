//! SQL statement construction with strict literal escaping.
//!
//! Identifiers come only from the static schema tables; every dynamic value
//! passes through [`quote_literal`]. Nothing else in the crate interpolates
//! input into SQL.

/// Quote a dynamic value as a SQL string literal.
///
/// Single quotes are doubled and backslashes escaped, so hostnames, comments
/// and passwords are safe regardless of content.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

fn ident(column: &str) -> String {
    format!("`{column}`")
}

fn ident_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_predicate(key_columns: &[&str], key_values: &[String]) -> String {
    debug_assert_eq!(key_columns.len(), key_values.len());
    key_columns
        .iter()
        .zip(key_values)
        .map(|(col, val)| format!("{} = {}", ident(col), quote_literal(val)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `SELECT <columns> FROM <table>` — the key-projection pass of discovery.
pub fn select_all(table: &str, columns: &[&str]) -> String {
    format!("SELECT {} FROM {}", ident_list(columns), ident(table))
}

/// `SELECT <columns> FROM <table> WHERE <key>` — one fully-expanded row.
pub fn select_where(
    table: &str,
    columns: &[&str],
    key_columns: &[&str],
    key_values: &[String],
) -> String {
    format!(
        "SELECT {} FROM {} WHERE {}",
        ident_list(columns),
        ident(table),
        key_predicate(key_columns, key_values)
    )
}

/// `INSERT INTO <table> (..) VALUES (..)` over column/value pairs.
pub fn insert(table: &str, values: &[(&str, String)]) -> String {
    let columns = values.iter().map(|(c, _)| *c).collect::<Vec<_>>();
    let literals = values
        .iter()
        .map(|(_, v)| quote_literal(v))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        ident(table),
        ident_list(&columns),
        literals
    )
}

/// `UPDATE <table> SET .. WHERE <key>` batching all dirty fields at once.
pub fn update<'a>(
    table: &str,
    assignments: impl IntoIterator<Item = (&'a str, &'a String)>,
    key_columns: &[&str],
    key_values: &[String],
) -> String {
    let set = assignments
        .into_iter()
        .map(|(col, val)| format!("{} = {}", ident(col), quote_literal(val)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {}",
        ident(table),
        set,
        key_predicate(key_columns, key_values)
    )
}

/// `DELETE FROM <table> WHERE <key>`.
pub fn delete(table: &str, key_columns: &[&str], key_values: &[String]) -> String {
    format!(
        "DELETE FROM {} WHERE {}",
        ident(table),
        key_predicate(key_columns, key_values)
    )
}
