use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Application settings
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AppSettings {
    pub gateway_url: String,
    pub default_port: u16,
    /// Overrides the platform download directory when set.
    pub download_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:8000".to_string(),
            default_port: 21,
            download_dir: None,
        }
    }
}

/// A saved connection profile. Passwords are never persisted; the user is
/// prompted on every connect.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(host: String, port: u16, username: String) -> Self {
        let display_name = host.clone();
        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            host,
            port,
            username,
            created_at: Utc::now(),
            last_used: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(AppError::ValidationError(
                "Port must be greater than 0".to_string(),
            ));
        }
        if self.username.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Main configuration structure
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Config {
    pub profiles: Vec<Profile>,
    pub settings: AppSettings,
}

/// Configuration manager for application settings and profile storage
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_config_from_path(&config_path)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration manager with a custom config path (useful for testing)
    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = Self::load_config_from_path(&config_path)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    fn get_config_path() -> Result<PathBuf> {
        let home_dir = std::env::var("HOME")
            .map_err(|_| AppError::ConfigError("HOME environment variable not set".to_string()))?;

        let config_dir = Path::new(&home_dir).join(".config").join("ftpdeck");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                AppError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        Ok(config_dir.join("config.toml"))
    }

    fn load_config_from_path(config_path: &Path) -> Result<Config> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(config_path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&config_content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Persist current config to disk
    pub fn save(&self) -> Result<()> {
        let toml = toml::to_string_pretty(&self.config)
            .map_err(|e| AppError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        fs::write(&self.config_path, toml)
            .map_err(|e| AppError::ConfigError(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    pub fn settings(&self) -> &AppSettings {
        &self.config.settings
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.config.profiles
    }

    /// Add a profile and persist it. Same host/port/username pairs are
    /// deduplicated best-effort.
    pub fn add_profile(&mut self, profile: Profile) -> Result<()> {
        profile.validate()?;

        if !self.config.profiles.iter().any(|p| {
            p.host == profile.host && p.port == profile.port && p.username == profile.username
        }) {
            self.config.profiles.push(profile);
        }
        self.save()
    }

    /// Update last_used for a profile by id and persist
    pub fn touch_last_used(&mut self, id: &str) -> Result<()> {
        if let Some(p) = self.config.profiles.iter_mut().find(|p| p.id == id) {
            p.last_used = Some(Utc::now());
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml")).unwrap();
        assert!(manager.profiles().is_empty());
        assert_eq!(manager.settings().default_port, 21);
        assert_eq!(manager.settings().gateway_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut manager = ConfigManager::with_path(&path).unwrap();
        manager
            .add_profile(Profile::new("ftp.example.com".to_string(), 21, "bob".to_string()))
            .unwrap();

        let reloaded = ConfigManager::with_path(&path).unwrap();
        assert_eq!(reloaded.profiles().len(), 1);
        assert_eq!(reloaded.profiles()[0].host, "ftp.example.com");
        assert_eq!(reloaded.profiles()[0].username, "bob");
    }

    #[test]
    fn test_duplicate_profiles_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ConfigManager::with_path(dir.path().join("config.toml")).unwrap();

        manager
            .add_profile(Profile::new("host".to_string(), 21, "bob".to_string()))
            .unwrap();
        manager
            .add_profile(Profile::new("host".to_string(), 21, "bob".to_string()))
            .unwrap();

        assert_eq!(manager.profiles().len(), 1);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ConfigManager::with_path(dir.path().join("config.toml")).unwrap();

        let result = manager.add_profile(Profile::new(String::new(), 21, "bob".to_string()));
        assert!(result.is_err());
        assert!(manager.profiles().is_empty());
    }
}
