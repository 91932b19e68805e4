//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::session::SessionSettings;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LUCKY_DRAW_CONFIG_PATH";
const DEFAULT_REGION: &str = "pune";
const DEFAULT_EVENT_ID: &str = "4";
const DEFAULT_STATE_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// City matched (ignoring case) by the region draw modes.
    pub designated_region: String,
    /// Identifier of the event, sent to the remote collaborators.
    pub event_id: String,
    /// Remote entrant feed; no feed when absent.
    pub feed_url: Option<String>,
    /// Remote winner-report sink; no reporting when absent.
    pub report_url: Option<String>,
    /// Directory of the file-backed session store.
    pub state_dir: PathBuf,
    /// Settings the session starts with.
    pub settings: SessionSettings,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        region = %config.designated_region,
                        feed = config.feed_url.is_some(),
                        report = config.report_url.is_some(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; omitted fields keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    designated_region: Option<String>,
    event_id: Option<String>,
    feed_url: Option<String>,
    report_url: Option<String>,
    state_dir: Option<PathBuf>,
    remove_winner: bool,
    use_custom_names: bool,
    enable_sound: bool,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            designated_region: non_blank(value.designated_region)
                .unwrap_or_else(|| DEFAULT_REGION.into()),
            event_id: non_blank(value.event_id).unwrap_or_else(|| DEFAULT_EVENT_ID.into()),
            feed_url: non_blank(value.feed_url),
            report_url: non_blank(value.report_url),
            state_dir: value
                .state_dir
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
            settings: SessionSettings {
                remove_winner: value.remove_winner,
                use_custom_names: value.use_custom_names,
                enable_sound: value.enable_sound,
            },
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.designated_region, "pune");
        assert_eq!(config.event_id, "4");
        assert_eq!(config.state_dir, PathBuf::from("data"));
        assert_eq!(config.feed_url, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "designated_region": "Mumbai",
                "event_id": "12",
                "feed_url": "https://feed.example/api/employees",
                "report_url": "  ",
                "remove_winner": true,
                "enable_sound": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.designated_region, "Mumbai");
        assert_eq!(config.event_id, "12");
        assert_eq!(
            config.feed_url.as_deref(),
            Some("https://feed.example/api/employees")
        );
        assert_eq!(config.report_url, None);
        assert!(config.settings.remove_winner);
        assert!(!config.settings.use_custom_names);
        assert!(config.settings.enable_sound);
    }
}
