//! Human and JSON rendering of plans, reports and observed state.

use serde_json::json;

use crate::reconcile::{Action, ObservedRecord, Plan, PlannedAction, RunReport};
use crate::schema::TableSchema;

pub(crate) fn planned_actions(actions: &[PlannedAction], as_json: bool) {
    if as_json {
        let items: Vec<_> = actions.iter().map(planned_action_json).collect();
        let changes = actions.iter().filter(|a| !a.plan.is_noop()).count();
        print_json(&json!({ "actions": items, "changes": changes }));
        return;
    }

    let mut changes = 0usize;
    for action in actions {
        match &action.plan {
            Plan::Noop => {}
            Plan::Create { .. } => {
                changes += 1;
                println!("+ {} {} (create)", action.resource, action.id);
            }
            Plan::Update { dirty } => {
                changes += 1;
                let fields: Vec<String> = dirty
                    .iter()
                    .map(|(col, val)| format!("{col}={val}"))
                    .collect();
                println!(
                    "~ {} {} (update: {})",
                    action.resource,
                    action.id,
                    fields.join(", ")
                );
            }
            Plan::Delete => {
                changes += 1;
                println!("- {} {} (delete)", action.resource, action.id);
            }
        }
    }
    if changes == 0 {
        println!("no changes; backend matches the manifest");
    } else {
        println!("{changes} change(s) pending");
    }
}

fn planned_action_json(action: &PlannedAction) -> serde_json::Value {
    let plan = match &action.plan {
        Plan::Noop => json!({ "action": "none" }),
        Plan::Create { values } => json!({
            "action": "create",
            "values": values
                .iter()
                .map(|(c, v)| ((*c).to_string(), json!(v)))
                .collect::<serde_json::Map<_, _>>(),
        }),
        Plan::Update { dirty } => json!({
            "action": "update",
            "set": dirty
                .iter()
                .map(|(c, v)| ((*c).to_string(), json!(v)))
                .collect::<serde_json::Map<_, _>>(),
        }),
        Plan::Delete => json!({ "action": "delete" }),
    };
    let mut value = json!({ "resource": action.resource, "id": action.id });
    value
        .as_object_mut()
        .expect("object literal")
        .extend(plan.as_object().expect("object literal").clone());
    value
}

pub(crate) fn run_report(report: &RunReport, as_json: bool) {
    if as_json {
        let outcomes: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| {
                json!({
                    "resource": o.resource,
                    "id": o.id,
                    "action": o.action.as_str(),
                    "ok": o.is_success(),
                    "error": o.error.as_ref().map(|e| e.to_string()),
                })
            })
            .collect();
        let commits: Vec<_> = report
            .commits
            .iter()
            .map(|c| {
                json!({
                    "resource": c.resource,
                    "loaded_runtime": c.loaded_runtime,
                    "saved_disk": c.saved_disk,
                    "errors": c.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                })
            })
            .collect();
        print_json(&json!({
            "ok": report.is_success(),
            "changed": report.changed(),
            "failed": report.failed(),
            "outcomes": outcomes,
            "commits": commits,
        }));
        return;
    }

    for outcome in &report.outcomes {
        match (&outcome.error, outcome.action) {
            (None, Action::None) => {}
            (None, action) => {
                println!("{} {} {}d", outcome.resource, outcome.id, action.as_str());
            }
            (Some(e), _) => {
                println!("{} {} FAILED: {e}", outcome.resource, outcome.id);
            }
        }
    }
    for commit in &report.commits {
        if commit.loaded_runtime {
            println!("{}s loaded to runtime", commit.resource);
        }
        if commit.saved_disk {
            println!("{}s saved to disk", commit.resource);
        }
        for error in &commit.errors {
            println!("commit FAILED: {error}");
        }
    }
    println!(
        "{} changed, {} failed, {} total",
        report.changed(),
        report.failed(),
        report.outcomes.len()
    );
}

pub(crate) fn observed_records(
    schema: &'static TableSchema,
    records: &[ObservedRecord],
    as_json: bool,
) {
    if as_json {
        let items: Vec<_> = records
            .iter()
            .map(|r| {
                let mut obj = serde_json::Map::new();
                for (col, val) in schema.key_columns.iter().zip(&r.key) {
                    obj.insert((*col).to_string(), json!(val));
                }
                for (col, val) in &r.attrs {
                    obj.insert((*col).to_string(), json!(val));
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        let mut top = serde_json::Map::new();
        top.insert(schema.table.to_string(), json!(items));
        print_json(&serde_json::Value::Object(top));
        return;
    }

    for record in records {
        let key: Vec<String> = schema
            .key_columns
            .iter()
            .zip(&record.key)
            .map(|(col, val)| format!("{col}={val}"))
            .collect();
        let attrs: Vec<String> = record
            .attrs
            .iter()
            .map(|(col, val)| format!("{col}={val}"))
            .collect();
        println!("{} {} | {}", schema.resource, key.join(" "), attrs.join(" "));
    }
    println!("{} {}(s)", records.len(), schema.resource);
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json render")
    );
}
