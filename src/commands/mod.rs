//! Application command handlers for wavecart.
//!
//! Each submodule handles one CLI command.
//!
//! # Commands
//! - `browse`: Interactive storefront with waveform previews (default)
//! - `catalog`: Print the card catalog to stdout
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod browse;
pub mod catalog;
pub mod config;
pub mod logs;

pub use browse::handle_browse;
pub use catalog::handle_catalog;
pub use config::handle_config;
pub use logs::handle_logs;
