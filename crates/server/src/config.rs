use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub static_dir: PathBuf,
    pub seed_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            database_url: "sqlite://./data/books.db".into(),
            static_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("static"),
            seed_path: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Layers defaults, then `server.toml` contents, then environment variables.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.server_bind = v.clone();
                }
                if let Some(v) = file_cfg.get("database_url") {
                    settings.database_url = v.clone();
                }
                if let Some(v) = file_cfg.get("static_dir") {
                    settings.static_dir = PathBuf::from(v);
                }
                if let Some(v) = file_cfg.get("seed_path") {
                    settings.seed_path = Some(PathBuf::from(v));
                }
            }
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable server.toml");
            }
        }
    }

    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = env(key) {
            settings.server_bind = v;
        }
    }
    for key in ["DATABASE_URL", "APP__DATABASE_URL"] {
        if let Some(v) = env(key) {
            settings.database_url = v;
        }
    }
    for key in ["STATIC_DIR", "APP__STATIC_DIR"] {
        if let Some(v) = env(key) {
            settings.static_dir = PathBuf::from(v);
        }
    }
    if let Some(v) = env("APP__SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }

    settings
}

/// Normalizes the configured url and makes sure a file database has a
/// directory to live in.
pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = storage::normalize_database_url(raw_database_url)
        .unwrap_or_else(|| Settings::default().database_url);
    storage::ensure_sqlite_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
