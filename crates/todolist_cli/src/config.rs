use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use todolist_core::LogLevel;

const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "todolist.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "todolist", "todolist")
}

fn default_database_path() -> String {
    match project_dirs() {
        Some(dirs) => dirs
            .data_dir()
            .join(DATABASE_FILE_NAME)
            .to_string_lossy()
            .to_string(),
        None => format!("~/.local/share/todolist/{DATABASE_FILE_NAME}"),
    }
}

fn default_log_level() -> String {
    LogLevel::build_default().as_str().to_string()
}

fn default_log_dir() -> String {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join("logs").to_string_lossy().to_string(),
        None => "~/.local/share/todolist/logs".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    ConfigDir,
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliConfig {
    /// Platform config location, e.g. `~/.config/todolist/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::ConfigDir)
    }

    /// Loads the config at `path`, writing a default file first if missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            return Ok(toml::from_str(&contents)?);
        }

        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(write_err)
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        expand_path(&self.database_path)
    }

    /// Log directory with `~` expanded and relative paths anchored at `base`.
    pub fn log_dir(&self, base: &Path) -> PathBuf {
        let dir = expand_path(&self.log_dir);
        if dir.is_absolute() {
            dir
        } else {
            base.join(dir)
        }
    }
}

/// Expands a leading `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::{expand_path, CliConfig};
    use std::path::{Path, PathBuf};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: CliConfig = toml::from_str("log_level = \"warn\"\n").unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.database_path, CliConfig::default().database_path);
        assert_eq!(config.log_dir, CliConfig::default().log_dir);
    }

    #[test]
    fn load_or_create_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = CliConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, CliConfig::default());

        std::fs::write(&path, "database_path = \"/tmp/custom.db\"\n").unwrap();
        let loaded = CliConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded.database_path(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = [").unwrap();
        assert!(CliConfig::load_or_create(&path).is_err());
    }

    #[test]
    fn relative_log_dir_is_anchored() {
        let config = CliConfig {
            log_dir: "logs".to_string(),
            ..CliConfig::default()
        };
        assert_eq!(config.log_dir(Path::new("/work")), PathBuf::from("/work/logs"));
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_path("/var/db"), PathBuf::from("/var/db"));
        assert_eq!(expand_path("~user/db"), PathBuf::from("~user/db"));
    }
}
