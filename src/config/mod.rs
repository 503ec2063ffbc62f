//! Configuration management for wavecart.
//!
//! Loading and saving application configuration from TOML files in the
//! user's config directory.

pub mod file;

pub use file::{config_path, BrowserConfig, PlaybackConfig, WavecartConfig};
