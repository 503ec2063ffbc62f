//! Configuration file management for wavecart.
//!
//! Configuration lives in the user's config directory as TOML. Every field
//! has a default, so a missing file or a partial file both work; `save`
//! writes the fully resolved configuration back.

use crate::playback::DEFAULT_PREVIEW_DURATION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Simulated playback behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Simulated preview length in seconds; playback auto-stops after this.
    pub preview_secs: u64,
    /// Event-loop poll interval in milliseconds (one animation tick per poll).
    pub frame_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            preview_secs: DEFAULT_PREVIEW_DURATION.as_secs(),
            frame_interval_ms: 16,
        }
    }
}

impl PlaybackConfig {
    pub fn preview_duration(&self) -> Duration {
        Duration::from_secs(self.preview_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Storefront browser behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Delay before a search keystroke re-filters the card list.
    pub search_debounce_ms: u64,
    /// How long the "Added!" cart flourish stays on a card.
    pub cart_flash_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            search_debounce_ms: 300,
            cart_flash_ms: 2000,
        }
    }
}

impl BrowserConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn cart_flash(&self) -> Duration {
        Duration::from_millis(self.cart_flash_ms)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WavecartConfig {
    pub playback: PlaybackConfig,
    pub browser: BrowserConfig,
    /// Optional path to a custom catalog file.
    pub catalog_path: Option<PathBuf>,
}

impl WavecartConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error rather than silently ignored.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If an existing config file cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(WavecartConfig::default());
        }
        let content = fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    /// - If the TOML is malformed
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: WavecartConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = config_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_dir = home.join(".config").join("wavecart");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("wavecart.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WavecartConfig::default();
        assert_eq!(config.playback.preview_secs, 30);
        assert_eq!(config.playback.frame_interval_ms, 16);
        assert_eq!(config.browser.search_debounce_ms, 300);
        assert_eq!(config.browser.cart_flash_ms, 2000);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_parse_partial_document_fills_defaults() {
        let config = WavecartConfig::parse(
            r#"
[playback]
preview_secs = 10
"#,
        )
        .unwrap();
        assert_eq!(config.playback.preview_secs, 10);
        assert_eq!(config.playback.frame_interval_ms, 16);
        assert_eq!(config.browser.search_debounce_ms, 300);
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        assert!(WavecartConfig::parse("[playback\npreview_secs = 10").is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = WavecartConfig::default();
        config.browser.cart_flash_ms = 1234;
        config.catalog_path = Some(PathBuf::from("/tmp/catalog.toml"));

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed = WavecartConfig::parse(&serialized).unwrap();
        assert_eq!(parsed.browser.cart_flash_ms, 1234);
        assert_eq!(parsed.catalog_path, config.catalog_path);
    }

    #[test]
    fn test_durations() {
        let config = WavecartConfig::default();
        assert_eq!(config.playback.preview_duration(), Duration::from_secs(30));
        assert_eq!(config.browser.search_debounce(), Duration::from_millis(300));
    }
}
