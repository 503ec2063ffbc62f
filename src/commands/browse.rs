//! The interactive storefront.
//!
//! Loads configuration and the card catalog, then hands control to the
//! storefront TUI until the user quits.

use crate::catalog::Catalog;
use crate::config::WavecartConfig;
use crate::ui::{ErrorScreen, StorefrontTui};

/// Runs the storefront browser.
///
/// Configuration or catalog failures are shown on a full-screen error
/// display before the command returns the underlying error.
pub fn handle_browse() -> Result<(), anyhow::Error> {
    tracing::info!("=== wavecart storefront started ===");

    let config = match WavecartConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            show_error(&format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/wavecart/wavecart.toml file and try again."
            ))?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: preview={}s, frame_interval={}ms, debounce={}ms",
        config.playback.preview_secs,
        config.playback.frame_interval_ms,
        config.browser.search_debounce_ms
    );

    let catalog = match Catalog::load_or_default(config.catalog_path.as_deref()) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!("Failed to load catalog: {err}");
            show_error(&format!(
                "Catalog Error:\n\n{err}\n\nPlease check your catalog file and try again."
            ))?;
            return Err(anyhow::anyhow!("Catalog error: {err}"));
        }
    };

    let mut tui = StorefrontTui::new(&config, catalog)
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;
    tui.run()?;

    tracing::info!("=== wavecart storefront exited ===");
    Ok(())
}

fn show_error(message: &str) -> anyhow::Result<()> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(message)?;
    error_screen.cleanup()
}
