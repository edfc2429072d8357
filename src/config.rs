//! Engine configuration.
//!
//! Defaults are read from a per-user config file. Environment variables
//! override any stored values so deployments can tune engines without
//! touching the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::logger::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Level of the default engine logger
    pub log_level: LogLevel,
    /// Log every statement through the engine logger
    pub show_sql: bool,
    /// Upper bound of the per-engine connection pool
    pub max_connections: u32,
    /// How long opening a connection may wait for the pool
    pub acquire_timeout_secs: u64,
    /// Directory for rolling log files; stderr when unset
    pub log_dir: Option<PathBuf>,
}

fn env_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn config_path() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var_os("APPDATA")
            .unwrap_or_else(|| std::env::var_os("USERPROFILE").unwrap_or_default());
        let mut path = PathBuf::from(appdata);
        path.push("QoreORM");
        path.push("config.json");
        path
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        let mut path = PathBuf::from(home);
        path.push(".qoreorm");
        path.push("config.json");
        path
    }
}

fn load_from_file(path: &Path) -> Option<EngineConfig> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            None
        }
    }
}

impl EngineConfig {
    fn defaults() -> Self {
        Self {
            log_level: LogLevel::Info,
            show_sql: false,
            max_connections: 5,
            acquire_timeout_secs: 30,
            log_dir: None,
        }
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("QOREORM_LOG_LEVEL").and_then(|v| v.parse().ok()) {
            self.log_level = level;
        }
        if let Some(value) = lookup("QOREORM_SHOW_SQL") {
            self.show_sql = env_bool(&value);
        }
        if let Some(max) = lookup("QOREORM_MAX_CONNECTIONS").and_then(|v| v.trim().parse().ok()) {
            self.max_connections = max;
        }
        if let Some(secs) = lookup("QOREORM_ACQUIRE_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.acquire_timeout_secs = secs;
        }
        if let Some(dir) = lookup("QOREORM_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    /// Reads `path` (falling back to defaults) and applies env overrides
    pub fn load_from(path: &Path) -> Self {
        let mut config = load_from_file(path).unwrap_or_else(Self::defaults);
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load() -> Self {
        Self::load_from(&config_path())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
