//! Runtime settings: where the database and the log file live, and how verbose
//! logging is. Defaults sit under the user's home directory; environment
//! variables override them.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use tracing_subscriber::{fmt, EnvFilter};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".medical-agenda";
const DB_FILE_NAME: &str = "agenda.sqlite";
const LOG_FILE_NAME: &str = "agenda.log";
const DEFAULT_LOG_LEVEL: &str = "info";

pub const DB_PATH_VAR: &str = "MEDICAL_AGENDA_DB";
pub const LOG_PATH_VAR: &str = "MEDICAL_AGENDA_LOG";
pub const LOG_LEVEL_VAR: &str = "MEDICAL_AGENDA_LOG_LEVEL";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding doctors, patients, and appointments.
    pub db_path: PathBuf,
    /// Append-only log file; defaults to the database's folder.
    pub log_path: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl AppConfig {
    /// Resolve settings from the process environment and the home directory.
    pub fn from_env() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        let data_dir = base_dirs.home_dir().join(DATA_DIR_NAME);
        Ok(Self::resolve(data_dir, |key| env::var(key).ok()))
    }

    /// Build the config from a default data directory and a variable lookup.
    /// Blank overrides fall back to the defaults.
    pub fn resolve(data_dir: PathBuf, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_path = get(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));
        let log_path = get(LOG_PATH_VAR).map(PathBuf::from).unwrap_or_else(|| {
            db_path
                .parent()
                .map(|dir| dir.join(LOG_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
        });
        let log_level = get(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            db_path,
            log_path,
            log_level,
        }
    }

    /// Install the global tracing subscriber. Output goes to the log file
    /// because the terminal belongs to the UI. `RUST_LOG` wins over the
    /// configured level.
    pub fn init_logging(&self) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create log directory")?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("failed to open log file {}", self.log_path.display()))?;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .try_init()
            .map_err(|err| anyhow!(err.to_string()))
            .context("failed to install log subscriber")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_live_in_the_data_dir() {
        let config = AppConfig::resolve(PathBuf::from("/home/ana/.medical-agenda"), lookup(&[]));

        assert_eq!(
            config.db_path,
            PathBuf::from("/home/ana/.medical-agenda/agenda.sqlite")
        );
        assert_eq!(
            config.log_path,
            PathBuf::from("/home/ana/.medical-agenda/agenda.log")
        );
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn database_override_moves_the_log_alongside() {
        let config = AppConfig::resolve(
            PathBuf::from("/home/ana/.medical-agenda"),
            lookup(&[(DB_PATH_VAR, "/srv/clinic/agenda.db"), (LOG_LEVEL_VAR, "debug")]),
        );

        assert_eq!(config.db_path, PathBuf::from("/srv/clinic/agenda.db"));
        assert_eq!(config.log_path, PathBuf::from("/srv/clinic/agenda.log"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = AppConfig::resolve(
            PathBuf::from("/data"),
            lookup(&[(DB_PATH_VAR, "  "), (LOG_PATH_VAR, "/tmp/agenda.log")]),
        );

        assert_eq!(config.db_path, PathBuf::from("/data/agenda.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/agenda.log"));
    }
}
