//! wavecart entry point.

mod app;
mod catalog;
mod commands;
mod config;
mod logging;
mod playback;
mod ui;
mod waveform;

fn main() {
    if let Err(err) = app::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
