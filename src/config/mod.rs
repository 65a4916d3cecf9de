use crate::errors::{AppError, AppResult};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default = "default_label_prefix")]
    pub service_label_prefix: String,
    #[serde(default = "default_weekday")]
    pub service_weekday: String,
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    #[serde(default = "default_media_url")]
    pub media_url: String,
}

fn default_label_prefix() -> String {
    "Sabbath Service".to_string()
}
fn default_weekday() -> String {
    "Sat".to_string()
}
fn default_media_dir() -> String {
    Config::config_dir()
        .join("media")
        .to_string_lossy()
        .to_string()
}
fn default_media_url() -> String {
    "/media/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            default_user: None,
            service_label_prefix: default_label_prefix(),
            service_weekday: default_weekday(),
            media_dir: default_media_dir(),
            media_url: default_media_url(),
        }
    }
}

impl Config {
    /// Return the configuration directory (`~/.cats`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cats")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("cats.conf")
    }

    /// Return the full path of the default SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("cats.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        let cfg = serde_yaml::from_str(&content)?;
        Ok(cfg)
    }

    /// The weekday on which the weekly service is opened ahead of check-in.
    pub fn weekday(&self) -> AppResult<Weekday> {
        self.service_weekday
            .trim()
            .parse::<Weekday>()
            .map_err(|_| AppError::Config(format!("invalid service_weekday '{}'", self.service_weekday)))
    }

    /// Initialize configuration directory, config file and database file.
    ///
    /// Returns the database path that was configured.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(db_path)
    }
}
