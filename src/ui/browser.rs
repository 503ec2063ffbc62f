//! Interactive storefront browser.
//!
//! Renders the card list with per-card waveform graphics, routes keyboard
//! and mouse input, and drives the scheduler that powers playback animation,
//! debounced search, and the cart flourish. All timer-driven state changes
//! flow through one scheduler timeline drained at the top of each frame.

use crate::catalog::{CardFilter, CardId, Catalog};
use crate::config::WavecartConfig;
use crate::playback::{
    CanvasMap, PlaybackController, PlaybackEvent, Scheduler, TaskHandle, WaveCanvas,
};
use crate::waveform::surface::Surface;
use crate::waveform::WaveformSpec;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

const BG: Color = Color::Rgb(10, 10, 14);
const FG: Color = Color::Rgb(230, 230, 235);
const DIM_FG: Color = Color::Rgb(110, 110, 120);
const ACCENT: Color = Color::Rgb(102, 126, 234);
const PLAYING_FG: Color = Color::Rgb(255, 107, 107);
const ADDED_FG: Color = Color::Rgb(0, 212, 170);

/// Rows per card: title, waveform, meta line, separator.
const WAVE_HEIGHT: u16 = 3;
const CARD_HEIGHT: u16 = WAVE_HEIGHT + 3;
/// Columns reserved left/right of the waveform inside a card row.
const CARD_MARGIN: u16 = 4;

/// Events routed through the scheduler's single timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Playback(PlaybackEvent),
    /// The search debounce expired; re-filter the list.
    ApplySearch,
    /// A card's "Added!" flourish expired.
    CartFlashExpired(CardId),
}

impl From<PlaybackEvent> for AppEvent {
    fn from(event: PlaybackEvent) -> Self {
        AppEvent::Playback(event)
    }
}

/// Terminal UI for browsing, filtering, and previewing the card catalog.
pub struct StorefrontTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    catalog: Catalog,
    filter: CardFilter,
    /// Indices into `catalog.cards` surviving the filter, in catalog order.
    visible: Vec<usize>,
    selected: usize,
    scroll_offset: usize,
    input: Input,
    input_mode: bool,
    categories: Vec<String>,
    /// 0 = all categories, 1.. = index into `categories` plus one.
    category_index: usize,
    canvases: CanvasMap,
    controller: PlaybackController,
    scheduler: Scheduler<AppEvent>,
    debounce: Option<TaskHandle>,
    cart_count: u32,
    cart_flash: HashMap<CardId, TaskHandle>,
    frame_interval: Duration,
    debounce_delay: Duration,
    cart_flash_delay: Duration,
    cleaned_up: bool,
}

impl StorefrontTui {
    /// Creates the storefront UI and paints every card's idle waveform.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    /// - If raw mode or alternate screen cannot be entered
    pub fn new(config: &WavecartConfig, catalog: Catalog) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let wave_width = Self::wave_width(size.width);

        // the id -> surface mapping is fixed here, once, for the whole run
        let mut canvases = CanvasMap::new();
        for card in &catalog.cards {
            canvases.insert(
                card.id.clone(),
                WaveCanvas::new(WaveformSpec::new(wave_width, WAVE_HEIGHT, card.seed())),
            );
        }

        let visible = (0..catalog.cards.len()).collect();
        let categories = catalog.categories();

        Ok(StorefrontTui {
            terminal,
            catalog,
            filter: CardFilter::new(),
            visible,
            selected: 0,
            scroll_offset: 0,
            input: Input::default(),
            input_mode: false,
            categories,
            category_index: 0,
            canvases,
            controller: PlaybackController::new(config.playback.preview_duration()),
            scheduler: Scheduler::new(),
            debounce: None,
            cart_count: 0,
            cart_flash: HashMap::new(),
            frame_interval: config.playback.frame_interval(),
            debounce_delay: config.browser.search_debounce(),
            cart_flash_delay: config.browser.cart_flash(),
            cleaned_up: false,
        })
    }

    fn wave_width(terminal_width: u16) -> u16 {
        terminal_width.saturating_sub(CARD_MARGIN).max(9)
    }

    /// Runs the storefront loop until the user quits.
    ///
    /// Each iteration drains due scheduler events, redraws, and polls input
    /// for one frame interval, so animation ticks advance even while the
    /// keyboard is idle.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!(
            "Storefront started with {} cards, {} categories",
            self.catalog.cards.len(),
            self.categories.len()
        );

        loop {
            let now = Instant::now();
            self.dispatch(now);
            self.draw()?;

            if event::poll(self.frame_interval)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key, Instant::now()) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, _) => self.handle_resize(width),
                    _ => {}
                }
            }
        }

        self.cleanup()
    }

    /// Drains the scheduler and applies every due event.
    fn dispatch(&mut self, now: Instant) {
        for event in self.scheduler.drain_due(now) {
            match event {
                AppEvent::Playback(playback_event) => {
                    self.controller.handle_event(
                        playback_event,
                        &mut self.canvases,
                        &mut self.scheduler,
                    );
                }
                AppEvent::ApplySearch => {
                    self.debounce = None;
                    self.apply_filter();
                }
                AppEvent::CartFlashExpired(id) => {
                    self.cart_flash.remove(&id);
                }
            }
        }
    }

    /// Handles one key event. Returns true when the UI should quit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.input_mode {
            self.handle_search_key(key, now);
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(now),
            KeyCode::Char('a') => self.add_selected_to_cart(now),
            KeyCode::Char('/') => self.input_mode = true,
            KeyCode::Tab => self.cycle_category(),
            _ => {}
        }
        false
    }

    /// Handles a key while the search box has focus.
    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => self.input_mode = false,
            KeyCode::Enter => {
                // apply immediately instead of waiting out the debounce
                if let Some(handle) = self.debounce.take() {
                    self.scheduler.cancel(handle);
                }
                self.apply_filter();
                self.input_mode = false;
            }
            _ => {
                if self.input.handle_event(&Event::Key(key)).is_some() {
                    self.arm_search_debounce(now);
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.select_previous(),
            MouseEventKind::ScrollDown => self.select_next(),
            _ => {}
        }
    }

    /// Rebuilds every canvas for the new terminal width, preserving the
    /// active card's progress overlay.
    fn handle_resize(&mut self, terminal_width: u16) {
        let wave_width = Self::wave_width(terminal_width);
        let controller = &self.controller;
        for (id, canvas) in self.canvases.iter_mut() {
            let progress = controller
                .is_card_playing(id)
                .then(|| controller.progress());
            canvas.resize(wave_width, WAVE_HEIGHT, progress);
        }
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if !self.visible.is_empty() && self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    fn selected_card_id(&self) -> Option<CardId> {
        self.visible
            .get(self.selected)
            .map(|&index| self.catalog.cards[index].id.clone())
    }

    fn toggle_selected(&mut self, now: Instant) {
        if let Some(id) = self.selected_card_id() {
            self.controller
                .toggle(&id, &mut self.canvases, &mut self.scheduler, now);
        }
    }

    /// Bumps the cart and flashes "Added!" on the card for a short while.
    /// Re-adding is ignored while the flourish is still showing.
    fn add_selected_to_cart(&mut self, now: Instant) {
        let Some(id) = self.selected_card_id() else {
            return;
        };
        if self.cart_flash.contains_key(&id) {
            return;
        }
        self.cart_count += 1;
        tracing::debug!("Card '{id}' added to cart ({} total)", self.cart_count);
        let handle =
            self.scheduler
                .set_timeout(now, self.cart_flash_delay, AppEvent::CartFlashExpired(id.clone()));
        self.cart_flash.insert(id, handle);
    }

    /// Re-arms the search debounce, cancelling the previous registration.
    fn arm_search_debounce(&mut self, now: Instant) {
        if let Some(handle) = self.debounce.take() {
            self.scheduler.cancel(handle);
        }
        self.debounce =
            Some(self.scheduler
                .set_timeout(now, self.debounce_delay, AppEvent::ApplySearch));
    }

    /// Applies the current query and category, keeping the selected card
    /// selected when it survives the filter.
    fn apply_filter(&mut self) {
        let previously_selected = self.selected_card_id();

        self.filter.set_query(self.input.value());
        self.visible = self.filter.apply(&self.catalog.cards);
        tracing::debug!(
            "Filter applied: query='{}', category={:?}, {} visible",
            self.filter.query(),
            self.filter.category(),
            self.visible.len()
        );

        self.selected = previously_selected
            .and_then(|id| {
                self.visible
                    .iter()
                    .position(|&index| self.catalog.cards[index].id == id)
            })
            .unwrap_or(0);
        self.scroll_offset = self.scroll_offset.min(self.selected);
    }

    fn cycle_category(&mut self) {
        self.category_index = (self.category_index + 1) % (self.categories.len() + 1);
        let category = if self.category_index == 0 {
            None
        } else {
            Some(self.categories[self.category_index - 1].clone())
        };
        self.filter.set_category(category);
        self.apply_filter();
    }

    fn category_label(&self) -> &str {
        if self.category_index == 0 {
            "All Categories"
        } else {
            &self.categories[self.category_index - 1]
        }
    }

    fn draw(&mut self) -> Result<()> {
        // precompute everything the closure needs to keep borrows disjoint
        let category_label = self.category_label().to_string();
        let now_playing = self.controller.active_card().and_then(|id| {
            self.catalog
                .get(id)
                .map(|card| (card.title.clone(), self.controller.progress()))
        });

        let cards_per_page = |height: u16| ((height / CARD_HEIGHT) as usize).max(1);
        let list_height = self
            .terminal
            .size()
            .map(|size| size.height.saturating_sub(5))
            .unwrap_or(0);
        let page = cards_per_page(list_height);
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + page {
            self.scroll_offset = self.selected + 1 - page;
        }

        self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(BG)), area);

            let header_area = Rect {
                height: area.height.min(1),
                ..area
            };
            let search_area = Rect {
                x: area.x,
                y: area.y + 1,
                width: area.width,
                height: area.height.saturating_sub(1).min(3),
            };
            let footer_height = 1;
            let list_area = Rect {
                x: area.x,
                y: area.y + 4,
                width: area.width,
                height: area.height.saturating_sub(4 + footer_height),
            };
            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            // header: app name left, now-playing and cart right
            let header_left = Line::from(Span::styled(
                "  wavecart",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ));
            let mut right_spans = Vec::new();
            if let Some((title, progress)) = &now_playing {
                right_spans.push(Span::styled(
                    format!("♪ {title} {:.0}%  ", progress * 100.0),
                    Style::default().fg(PLAYING_FG),
                ));
            }
            right_spans.push(Span::styled(
                format!("Cart: {}  ", self.cart_count),
                Style::default().fg(FG),
            ));
            frame.render_widget(Paragraph::new(header_left), header_area);
            frame.render_widget(
                Paragraph::new(Line::from(right_spans)).alignment(Alignment::Right),
                header_area,
            );

            // search box with the category filter on its right edge
            let search_style = if self.input_mode {
                Style::default().fg(ACCENT)
            } else {
                Style::default().fg(DIM_FG)
            };
            let search_block = Block::default()
                .borders(Borders::ALL)
                .border_style(search_style)
                .title(" Search ")
                .title_style(search_style);
            let search_inner = search_block.inner(search_area);
            frame.render_widget(search_block, search_area);
            let query_line = Line::from(vec![
                Span::styled(self.input.value().to_string(), Style::default().fg(FG)),
            ]);
            frame.render_widget(Paragraph::new(query_line), search_inner);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!("[{category_label}] "),
                    Style::default().fg(DIM_FG),
                )))
                .alignment(Alignment::Right),
                search_inner,
            );
            if self.input_mode {
                let cursor_x =
                    search_inner.x + (self.input.visual_cursor() as u16).min(search_inner.width);
                frame.set_cursor_position((cursor_x, search_inner.y));
            }

            // card list
            if self.visible.is_empty() {
                frame.render_widget(
                    Paragraph::new("No cards match the current filter")
                        .style(Style::default().fg(DIM_FG))
                        .alignment(Alignment::Center),
                    list_area,
                );
            } else {
                let mut y = list_area.y;
                for (row, &card_index) in
                    self.visible.iter().enumerate().skip(self.scroll_offset)
                {
                    if y + CARD_HEIGHT > list_area.y + list_area.height {
                        break;
                    }
                    let card = &self.catalog.cards[card_index];
                    let is_selected = row == self.selected;
                    let is_playing = self.controller.is_card_playing(&card.id);

                    let marker = if is_selected { "❯ " } else { "  " };
                    let play_glyph = if is_playing { "⏸ " } else { "▶ " };
                    let mut title_spans = vec![
                        Span::styled(marker, Style::default().fg(ACCENT)),
                        Span::styled(
                            play_glyph,
                            Style::default().fg(if is_playing { PLAYING_FG } else { DIM_FG }),
                        ),
                        Span::styled(
                            card.title.clone(),
                            Style::default()
                                .fg(if is_selected { ACCENT } else { FG })
                                .add_modifier(Modifier::BOLD),
                        ),
                    ];
                    if self.cart_flash.contains_key(&card.id) {
                        title_spans.push(Span::styled(
                            "  Added!",
                            Style::default().fg(ADDED_FG).add_modifier(Modifier::BOLD),
                        ));
                    }
                    let title_area = Rect {
                        x: list_area.x,
                        y,
                        width: list_area.width,
                        height: 1,
                    };
                    frame.render_widget(Paragraph::new(Line::from(title_spans)), title_area);
                    frame.render_widget(
                        Paragraph::new(Line::from(Span::styled(
                            format!("${:.2}  ", card.price_usd),
                            Style::default().fg(FG),
                        )))
                        .alignment(Alignment::Right),
                        title_area,
                    );

                    // waveform rows, one terminal cell per surface pixel
                    if let Some(canvas) = self.canvases.get(&card.id) {
                        let surface = canvas.surface();
                        let visible_width =
                            surface.width().min(list_area.width.saturating_sub(CARD_MARGIN));
                        for wave_row in 0..surface.height().min(WAVE_HEIGHT) {
                            let spans: Vec<Span> = surface.row(wave_row)
                                [..visible_width as usize]
                                .iter()
                                .map(|pixel| {
                                    Span::styled(
                                        " ",
                                        Style::default()
                                            .bg(Color::Rgb(pixel.r, pixel.g, pixel.b)),
                                    )
                                })
                                .collect();
                            frame.render_widget(
                                Paragraph::new(Line::from(spans)),
                                Rect {
                                    x: list_area.x + CARD_MARGIN / 2,
                                    y: y + 1 + wave_row,
                                    width: visible_width,
                                    height: 1,
                                },
                            );
                        }
                    }

                    let meta = format!(
                        "    {} • {} • {}",
                        card.category,
                        card.duration_label(),
                        card.tags.join(", ")
                    );
                    frame.render_widget(
                        Paragraph::new(Line::from(Span::styled(
                            meta,
                            Style::default().fg(DIM_FG),
                        ))),
                        Rect {
                            x: list_area.x,
                            y: y + 1 + WAVE_HEIGHT,
                            width: list_area.width,
                            height: 1,
                        },
                    );

                    y += CARD_HEIGHT;
                }
            }

            // footer help line
            let help = if self.input_mode {
                "esc done • enter apply now • type to search"
            } else {
                "↑/↓ browse • enter play/stop • a add to cart • / search • tab category • q quit"
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!(" {help}"),
                    Style::default().fg(DIM_FG),
                ))),
                footer_area,
            );
        })?;

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for StorefrontTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
