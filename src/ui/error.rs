//! Full-screen error display for failures before or after the storefront UI.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};
use std::time::Duration;

/// Error screen for displaying human-readable error messages.
///
/// Fills the terminal with a red background and centers the message; any key
/// dismisses it.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    /// - If raw mode or alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays `message` until the user presses any key.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        let style = Style::default()
            .fg(Color::Rgb(255, 255, 255))
            .bg(Color::Rgb(170, 20, 20));

        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(
                    ratatui::widgets::Block::default().style(style),
                    area,
                );

                let text_width = (area.width * 8) / 10;
                let centered = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height / 2,
                    width: text_width,
                    height: area.height.saturating_sub(area.height / 2),
                };
                let paragraph = Paragraph::new(Text::styled(message, style))
                    .alignment(Alignment::Center)
                    .wrap(ratatui::widgets::Wrap { trim: true });
                frame.render_widget(paragraph, centered);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
