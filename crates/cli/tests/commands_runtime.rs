use std::env;
use std::sync::{Mutex, OnceLock};

use medstock_cli::commands::{ask, doctor, migrate, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("MEDSTOCK_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_unsupported_database() {
    with_env(&[("MEDSTOCK_DATABASE_URL", "mysql://localhost/inventory")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("medstock.db").display());

    with_env(&[("MEDSTOCK_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["status"], "ok");
        assert!(first_payload["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("demo inventory loaded"));

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(
            second_payload["message"],
            "demo inventory already present; nothing inserted"
        );
    });
}

#[test]
fn ask_answers_from_seeded_inventory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("medstock.db").display());

    with_env(&[("MEDSTOCK_DATABASE_URL", url.as_str())], || {
        assert_eq!(seed::run().exit_code, 0);

        let result = ask::run("How many IV fluids do we have?");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["message"], "We currently have 18 IV fluids in stock.");
    });
}

#[test]
fn ask_replies_with_clarification_for_unknown_items() {
    with_env(&[("MEDSTOCK_DATABASE_URL", "sqlite::memory:")], || {
        let result = ask::run("Update the stock please");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(
            payload["message"],
            "Please specify the item and new quantity to update the stock."
        );
    });
}

#[test]
fn ask_rejects_blank_messages() {
    with_env(&[], || {
        let result = ask::run("   ");
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn doctor_json_reports_connectivity() {
    with_env(&[("MEDSTOCK_DATABASE_URL", "sqlite::memory:")], || {
        let payload = parse_payload(&doctor::run(true));
        let checks = payload["checks"].as_array().cloned().unwrap_or_default();

        let connectivity = checks
            .iter()
            .find(|check| check["name"] == "database_connectivity")
            .expect("connectivity check present");
        assert_eq!(connectivity["status"], "pass");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "MEDSTOCK_DATABASE_URL",
        "MEDSTOCK_DATABASE_MAX_CONNECTIONS",
        "MEDSTOCK_DATABASE_TIMEOUT_SECS",
        "MEDSTOCK_SERVER_BIND_ADDRESS",
        "MEDSTOCK_SERVER_PORT",
        "MEDSTOCK_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "MEDSTOCK_SERVER_CORS_ALLOWED_ORIGINS",
        "MEDSTOCK_SERVER_SESSION_IDLE_SECS",
        "MEDSTOCK_SERVER_MAX_SESSIONS",
        "MEDSTOCK_LOGGING_LEVEL",
        "MEDSTOCK_LOGGING_FORMAT",
        "MEDSTOCK_LOG_LEVEL",
        "MEDSTOCK_LOG_FORMAT",
        "MEDSTOCK_NLU_EXPIRY_DEFAULT_DAYS",
        "MEDSTOCK_NLU_EXTRA_ITEMS",
    ];
    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
