use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use medstock_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct FieldLine {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<FieldLine> {
    let cors = if config.server.cors_allowed_origins.is_empty() {
        "<any>".to_string()
    } else {
        config.server.cors_allowed_origins.join(", ")
    };
    let extra_items = if config.nlu.extra_items.is_empty() {
        "<none>".to_string()
    } else {
        config.nlu.extra_items.join(", ")
    };

    vec![
        FieldLine {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["MEDSTOCK_DATABASE_URL"],
        },
        FieldLine {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["MEDSTOCK_DATABASE_MAX_CONNECTIONS"],
        },
        FieldLine {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["MEDSTOCK_DATABASE_TIMEOUT_SECS"],
        },
        FieldLine {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["MEDSTOCK_SERVER_BIND_ADDRESS"],
        },
        FieldLine {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["MEDSTOCK_SERVER_PORT"],
        },
        FieldLine {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["MEDSTOCK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        FieldLine {
            key: "server.session_idle_secs",
            value: config.server.session_idle_secs.to_string(),
            env_keys: &["MEDSTOCK_SERVER_SESSION_IDLE_SECS"],
        },
        FieldLine {
            key: "server.max_sessions",
            value: config.server.max_sessions.to_string(),
            env_keys: &["MEDSTOCK_SERVER_MAX_SESSIONS"],
        },
        FieldLine {
            key: "server.cors_allowed_origins",
            value: cors,
            env_keys: &["MEDSTOCK_SERVER_CORS_ALLOWED_ORIGINS"],
        },
        FieldLine {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["MEDSTOCK_LOGGING_LEVEL", "MEDSTOCK_LOG_LEVEL"],
        },
        FieldLine {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["MEDSTOCK_LOGGING_FORMAT", "MEDSTOCK_LOG_FORMAT"],
        },
        FieldLine {
            key: "nlu.expiry_default_days",
            value: config.nlu.expiry_default_days.to_string(),
            env_keys: &["MEDSTOCK_NLU_EXPIRY_DEFAULT_DAYS"],
        },
        FieldLine {
            key: "nlu.extra_items",
            value: extra_items,
            env_keys: &["MEDSTOCK_NLU_EXTRA_ITEMS"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("medstock.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/medstock.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
