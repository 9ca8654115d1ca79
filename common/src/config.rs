// Configuration management with layered configuration (file, env)

use crate::models::MonitoredChannel;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
///
/// The monitored channel list is an explicit field here, constructed once at
/// startup and passed into the scan engine as immutable data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub youtube: YouTubeConfig,
    pub discord: DiscordConfig,
    pub database: DatabaseConfig,
    pub scan: ScanSettings,
    pub observability: ObservabilityConfig,
    pub channels: Vec<MonitoredChannel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Google Cloud API key used for the search endpoint
    pub api_key: String,
    /// Search API base URL, overridable for tests
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

fn default_search_timeout() -> u64 {
    30
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Webhook URL new-video announcements are posted to
    pub webhook_url: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
}

fn default_webhook_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file backing the ledger
    pub path: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Minimum time between two scans of the same channel
    pub recheck_interval_hours: u64,
    /// How far back the search looks for uploads; must exceed the recheck
    /// interval so a delayed cycle cannot open a gap between two scans
    pub lookback_hours: u64,
    /// Page size requested from the search API
    pub max_results: u32,
    /// Delay between successive candidates and between channels
    pub pace_seconds: u64,
    /// How long announced-video rows are retained
    pub announcement_retention_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("TUBEWATCH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.youtube.api_key.is_empty() {
            return Err("YouTube API key cannot be empty".to_string());
        }

        if self.discord.webhook_url.is_empty() {
            return Err("Discord webhook URL cannot be empty".to_string());
        }

        if self.database.path.is_empty() {
            return Err("Database path cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        if self.scan.recheck_interval_hours == 0 {
            return Err("Scan recheck_interval_hours must be greater than 0".to_string());
        }
        // The lookback window must strictly exceed the recheck interval,
        // otherwise a skipped or delayed cycle can drop uploads between scans.
        if self.scan.lookback_hours <= self.scan.recheck_interval_hours {
            return Err(format!(
                "Scan lookback_hours ({}) must exceed recheck_interval_hours ({})",
                self.scan.lookback_hours, self.scan.recheck_interval_hours
            ));
        }
        if self.scan.max_results == 0 {
            return Err("Scan max_results must be greater than 0".to_string());
        }

        if self.channels.is_empty() {
            return Err("At least one monitored channel must be configured".to_string());
        }
        for channel in &self.channels {
            if channel.channel_id.is_empty() {
                return Err(format!("Channel '{}' has an empty channel_id", channel.name));
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            youtube: YouTubeConfig {
                api_key: String::new(),
                base_url: default_youtube_base_url(),
                timeout_seconds: default_search_timeout(),
            },
            discord: DiscordConfig {
                webhook_url: String::new(),
                timeout_seconds: default_webhook_timeout(),
            },
            database: DatabaseConfig {
                path: "tubewatch.sqlite".to_string(),
                max_connections: 5,
                connect_timeout_seconds: 30,
            },
            scan: ScanSettings {
                recheck_interval_hours: 12,
                lookback_hours: 48,
                max_results: 1,
                pace_seconds: 10,
                announcement_retention_days: 30,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
            channels: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.youtube.api_key = "test-key".to_string();
        settings.discord.webhook_url = "https://discord.example/webhook".to_string();
        settings.channels.push(MonitoredChannel {
            name: "Test Channel".to_string(),
            channel_id: "UC123".to_string(),
        });
        settings
    }

    #[test]
    fn test_valid_settings_pass_validation() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_api_key() {
        let mut settings = valid_settings();
        settings.youtube.api_key = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_webhook_url() {
        let mut settings = valid_settings();
        settings.discord.webhook_url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_database_path() {
        let mut settings = valid_settings();
        settings.database.path = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_requires_lookback_beyond_recheck_interval() {
        let mut settings = valid_settings();
        settings.scan.lookback_hours = 12;
        settings.scan.recheck_interval_hours = 12;
        assert!(settings.validate().is_err());

        settings.scan.lookback_hours = 48;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_requires_channels() {
        let mut settings = valid_settings();
        settings.channels.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_channel_id() {
        let mut settings = valid_settings();
        settings.channels.push(MonitoredChannel {
            name: "Broken".to_string(),
            channel_id: String::new(),
        });
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_default_scan_windows() {
        let settings = Settings::default();
        assert_eq!(settings.scan.recheck_interval_hours, 12);
        assert_eq!(settings.scan.lookback_hours, 48);
        assert_eq!(settings.scan.announcement_retention_days, 30);
    }
}
