//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the appropriate
//! command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal storefront for browsing audio previews with animated waveforms
#[derive(Parser)]
#[command(name = "wavecart")]
#[command(version)]
#[command(about = "A terminal storefront for browsing audio previews with animated waveforms")]
#[command(
    long_about = "A terminal storefront for browsing audio previews.\n\nEach card carries a seed-deterministic waveform; toggling a card plays a\nsimulated 30-second preview with an animated progress overlay. Search and\ncategory filters narrow the list as you type.\n\nDEFAULT COMMAND:\n    If no command is specified, 'browse' is used by default.\n\nEXAMPLES:\n    # Open the storefront\n    $ wavecart\n\n    # Print the catalog\n    $ wavecart catalog\n\n    # Edit configuration\n    $ wavecart config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavecart/wavecart.toml\n    Logs:               ~/.local/state/wavecart/wavecart.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the storefront with waveform previews (default)
    ///
    /// Arrow keys navigate, Enter toggles playback, 'a' adds to cart,
    /// '/' focuses the search box, Tab cycles categories, 'q' quits.
    #[command(visible_alias = "b")]
    Browse,

    /// Print the card catalog to stdout
    ///
    /// Lists every card with its category, duration, price, and tags.
    #[command(visible_alias = "ls")]
    Catalog,

    /// Open configuration file in your preferred editor
    ///
    /// Edit playback and browser settings. Uses the $EDITOR environment
    /// variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Save the output to your shell's completion directory or source it
    /// directly.
    ///
    /// Examples:
    ///   wavecart completions bash > wavecart.bash
    ///   wavecart completions zsh > _wavecart
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavecart", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Browse) => commands::handle_browse()?,
        Some(Commands::Catalog) => commands::handle_catalog()?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
