//! End-to-end reconciliation runs against the fake admin backend.

use proxsync::{reconcile, Action, Manifest, Plan};

use super::fixtures::FakeAdmin;

fn entities(manifest: &str) -> Vec<proxsync::ManagedEntity> {
    Manifest::parse(manifest)
        .expect("parse manifest")
        .entities()
        .expect("entities")
}

#[test]
fn create_missing_server_with_defaults() {
    let admin = FakeAdmin::new();
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        port = 3306
        hostgroup_id = 0
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(report.is_success());
    assert_eq!(report.changed(), 1);
    assert_eq!(report.outcomes[0].action, Action::Create);

    // Exactly one INSERT, carrying the schema defaults.
    let inserts = admin.statements_containing("INSERT INTO");
    assert_eq!(inserts.len(), 1);

    let rows = admin.rows("mysql_servers");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("hostname").unwrap(), "10.0.0.1");
    assert_eq!(row.get("port").unwrap(), "3306");
    assert_eq!(row.get("hostgroup_id").unwrap(), "0");
    assert_eq!(row.get("status").unwrap(), "ONLINE");
    assert_eq!(row.get("weight").unwrap(), "1");
    assert_eq!(row.get("compression").unwrap(), "0");
    assert_eq!(row.get("max_connections").unwrap(), "1000");
    assert_eq!(row.get("max_replication_lag").unwrap(), "0");
    assert_eq!(row.get("use_ssl").unwrap(), "0");
    assert_eq!(row.get("max_latency_ms").unwrap(), "0");
    assert_eq!(row.get("comment").unwrap(), "");

    // Re-discovery sees the same defaults.
    let observed = reconcile::discover(&admin, &proxsync::SERVERS).expect("discover");
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].attrs.get("status").map(String::as_str), Some("ONLINE"));
    assert_eq!(observed[0].attrs.get("weight").map(String::as_str), Some("1"));
}

#[test]
fn second_run_with_unchanged_state_mutates_nothing() {
    let admin = FakeAdmin::new();
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        weight = 5

        [[users]]
        username = "app"
        password = "hash"
        "#,
    );

    let first = reconcile::run(&admin, &declared).expect("first run");
    assert!(first.is_success());
    assert_eq!(first.changed(), 2);

    admin.clear_log();
    let second = reconcile::run(&admin, &declared).expect("second run");
    assert!(second.is_success());
    assert_eq!(second.changed(), 0);
    for outcome in &second.outcomes {
        assert_eq!(outcome.action, Action::None);
    }

    // Only reads: no mutation statements, and no commit commands either.
    for needle in ["INSERT INTO", "UPDATE ", "DELETE FROM", "LOAD ", "SAVE "] {
        assert!(
            admin.statements_containing(needle).is_empty(),
            "unexpected {needle} statement on a converged run"
        );
    }
}

#[test]
fn changed_weight_is_exactly_one_update_touching_only_weight() {
    let admin = FakeAdmin::new();
    admin.seed_server("10.0.0.1", "3306", "0", &[]);
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        weight = 5
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(report.is_success());
    assert_eq!(report.outcomes[0].action, Action::Update);

    let updates = admin.statements_containing("UPDATE ");
    assert_eq!(updates.len(), 1);
    assert!(updates[0].contains("`weight` = '5'"));
    assert!(!updates[0].contains("`status`"), "only weight may be set");

    let rows = admin.rows("mysql_servers");
    assert_eq!(rows[0].get("weight").unwrap(), "5");
    assert_eq!(rows[0].get("status").unwrap(), "ONLINE");
    assert_eq!(rows[0].get("max_connections").unwrap(), "1000");
}

#[test]
fn multiple_dirty_fields_batch_into_a_single_update() {
    let admin = FakeAdmin::new();
    admin.seed_server("10.0.0.1", "3306", "0", &[]);
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        weight = 5
        status = "OFFLINE_SOFT"
        max_connections = 500
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(report.is_success());

    let updates = admin.statements_containing("UPDATE ");
    assert_eq!(updates.len(), 1, "all dirty fields must share one statement");
    assert!(updates[0].contains("`weight` = '5'"));
    assert!(updates[0].contains("`status` = 'OFFLINE_SOFT'"));
    assert!(updates[0].contains("`max_connections` = '500'"));
    assert!(!updates[0].contains("`use_ssl`"));
}

#[test]
fn absent_user_is_deleted_and_gone_on_rediscovery() {
    let admin = FakeAdmin::new();
    admin.seed("mysql_users", &[("username", "app"), ("active", "1")]);
    let declared = entities(
        r#"
        [[users]]
        username = "app"
        ensure = "absent"
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(report.is_success());
    assert_eq!(report.outcomes[0].action, Action::Delete);

    let deletes = admin.statements_containing("DELETE FROM");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].contains("`username` = 'app'"));

    assert!(admin.rows("mysql_users").is_empty());
    assert!(reconcile::discover(&admin, &proxsync::USERS)
        .expect("discover")
        .is_empty());
}

#[test]
fn identity_change_is_delete_plus_create_never_update() {
    let admin = FakeAdmin::new();
    admin.seed_server("db1", "3306", "0", &[("weight", "7")]);
    // The same logical backend moves to port 3307.
    let declared = entities(
        r#"
        [[servers]]
        hostname = "db1"
        port = 3306
        ensure = "absent"

        [[servers]]
        hostname = "db1"
        port = 3307
        weight = 7
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(report.is_success());

    let actions: Vec<Action> = report.outcomes.iter().map(|o| o.action).collect();
    assert!(actions.contains(&Action::Delete));
    assert!(actions.contains(&Action::Create));
    assert!(!actions.contains(&Action::Update));

    let rows = admin.rows("mysql_servers");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("port").unwrap(), "3307");
}

#[test]
fn plan_only_stages_without_touching_the_backend() {
    let admin = FakeAdmin::new();
    admin.seed_server("10.0.0.1", "3306", "0", &[]);
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        weight = 9
        "#,
    );

    let actions = reconcile::plan_only(&admin, &declared).expect("plan");
    assert_eq!(actions.len(), 1);
    let Plan::Update { dirty } = &actions[0].plan else {
        panic!("expected update plan");
    };
    assert_eq!(dirty.len(), 1);
    assert_eq!(dirty.get("weight").map(String::as_str), Some("9"));

    for needle in ["INSERT INTO", "UPDATE ", "DELETE FROM", "LOAD ", "SAVE "] {
        assert!(admin.statements_containing(needle).is_empty());
    }
    assert_eq!(admin.rows("mysql_servers")[0].get("weight").unwrap(), "1");
}

#[test]
fn failed_entity_does_not_block_its_siblings() {
    let admin = FakeAdmin::new();
    admin.fail_on("'10.0.0.1'");
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"

        [[servers]]
        hostname = "10.0.0.2"
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(!report.is_success());
    assert_eq!(report.failed(), 1);
    assert_eq!(report.changed(), 1);

    let failed = report.outcomes.iter().find(|o| !o.is_success()).unwrap();
    assert_eq!(failed.id, "10.0.0.1:3306-0");
    let ok = report.outcomes.iter().find(|o| o.is_success()).unwrap();
    assert_eq!(ok.id, "10.0.0.2:3306-0");

    // The surviving mutation still gets committed.
    assert_eq!(admin.statements_containing("LOAD MYSQL SERVERS").len(), 1);
    let rows = admin.rows("mysql_servers");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("hostname").unwrap(), "10.0.0.2");
}

#[test]
fn swallowed_insert_fails_the_post_condition_check() {
    let admin = FakeAdmin::new();
    admin.swallow_on("INSERT INTO");
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(!report.is_success());
    let outcome = &report.outcomes[0];
    let err = outcome.error.as_ref().expect("verification error");
    assert!(err.to_string().contains("no row is visible"));
}

#[test]
fn swallowed_delete_fails_the_post_condition_check() {
    let admin = FakeAdmin::new();
    admin.seed("mysql_users", &[("username", "app")]);
    admin.swallow_on("DELETE FROM");
    let declared = entities(
        r#"
        [[users]]
        username = "app"
        ensure = "absent"
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(!report.is_success());
    let err = report.outcomes[0].error.as_ref().expect("verification error");
    assert!(err.to_string().contains("still visible"));
}

#[test]
fn malformed_discovery_aborts_before_any_mutation() {
    let admin = FakeAdmin::new();
    // An embedded tab corrupts the full-row shape for this record.
    admin.seed_server("10.0.0.1", "3306", "0", &[("comment", "broken\tcomment")]);
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.2"
        "#,
    );

    let err = reconcile::run(&admin, &declared).unwrap_err();
    assert!(matches!(
        err,
        proxsync::reconcile::DiscoveryError::MalformedRow { .. }
    ));
    for needle in ["INSERT INTO", "UPDATE ", "DELETE FROM", "LOAD ", "SAVE "] {
        assert!(
            admin.statements_containing(needle).is_empty(),
            "no mutation may run after a discovery failure"
        );
    }
}

#[test]
fn discovery_failure_in_a_later_table_blocks_the_whole_run() {
    let admin = FakeAdmin::new();
    // The user table is corrupt; the server table is clean and has a pending
    // create. Nothing may be applied anywhere.
    admin.seed(
        "mysql_users",
        &[("username", "app"), ("default_schema", "bad\tvalue")],
    );
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"

        [[users]]
        username = "app"
        "#,
    );

    let err = reconcile::run(&admin, &declared).unwrap_err();
    assert!(matches!(
        err,
        proxsync::reconcile::DiscoveryError::MalformedRow {
            table: "mysql_users",
            ..
        }
    ));
    for needle in ["INSERT INTO", "UPDATE ", "DELETE FROM", "LOAD ", "SAVE "] {
        assert!(
            admin.statements_containing(needle).is_empty(),
            "no table may be mutated when any discovery fails"
        );
    }
    assert!(admin.rows("mysql_servers").is_empty());
}

#[test]
fn duplicate_backend_rows_fail_the_run_loudly() {
    let admin = FakeAdmin::new();
    admin.seed_server("10.0.0.1", "3306", "0", &[]);
    admin.seed_server("10.0.0.1", "3306", "0", &[("weight", "2")]);
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        "#,
    );

    let err = reconcile::run(&admin, &declared).unwrap_err();
    assert!(matches!(
        err,
        proxsync::reconcile::DiscoveryError::DuplicateKey { .. }
    ));
}

#[test]
fn quoted_values_round_trip_through_the_backend() {
    let admin = FakeAdmin::new();
    let declared = entities(
        r#"
        [[servers]]
        hostname = "10.0.0.1"
        comment = "primary's replica"
        "#,
    );

    let report = reconcile::run(&admin, &declared).expect("run");
    assert!(report.is_success());
    let rows = admin.rows("mysql_servers");
    assert_eq!(rows[0].get("comment").unwrap(), "primary's replica");

    // And a second run sees no drift.
    admin.clear_log();
    let second = reconcile::run(&admin, &declared).expect("second run");
    assert_eq!(second.changed(), 0);
}
