use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

pub const HOME_ENV: &str = "SPENDING_HOME";
pub const API_URL_ENV: &str = "SPENDING_API_URL";
pub const LOG_ENV: &str = "SPENDING_LOG";
const TMP_SUFFIX: &str = "tmp";

/// Loads and persists [`Config`] as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Uses `<base>/config/config.json`, creating the directories.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join("config.json")))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the stored config; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    /// Like [`load`](Self::load), then applies `SPENDING_API_URL` and `SPENDING_LOG`.
    pub fn load_with_env(&self) -> Result<Config, ConfigError> {
        let mut config = self.load()?;
        apply_overrides(
            &mut config,
            env::var(API_URL_ENV).ok(),
            env::var(LOG_ENV).ok(),
        );
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_all(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

/// `SPENDING_HOME`, else the platform config dir, else `./.spending`.
pub fn default_base_dir() -> PathBuf {
    if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::config_dir()
        .map(|dir| dir.join("spending"))
        .unwrap_or_else(|| PathBuf::from(".spending"))
}

fn apply_overrides(config: &mut Config, api_url: Option<String>, log: Option<String>) {
    if let Some(url) = api_url.filter(|value| !value.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(filter) = log.filter(|value| !value.trim().is_empty()) {
        config.log_filter = filter.trim().to_string();
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_all(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
