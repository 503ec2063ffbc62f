//! Single-item "now playing" state and its animated progress overlay.
//!
//! Playback is purely simulated: toggling a card marks it playing, drives a
//! per-frame repaint of its waveform with a growing progress overlay, and a
//! one-shot watchdog force-stops it after the configured preview length. At
//! most one card is ever playing; every start tears the previous card down
//! before the new one goes live.

pub mod scheduler;

pub use scheduler::{Scheduler, TaskHandle};

use crate::catalog::CardId;
use crate::waveform::{self, CellSurface, Rgb, WaveformSpec};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Progress added per animation tick; ~100 ticks from start to saturation.
pub const PROGRESS_STEP: f32 = 0.01;

/// Default simulated preview length.
pub const DEFAULT_PREVIEW_DURATION: Duration = Duration::from_secs(30);

/// Background color behind waveform bars.
const CANVAS_BG: Rgb = Rgb::new(18, 18, 24);

/// Events the controller registers with the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// One animation frame for the card's progress overlay.
    Tick(CardId),
    /// The watchdog: the simulated preview duration has elapsed.
    PreviewElapsed(CardId),
}

/// One card's drawing target: waveform geometry plus the surface it is
/// painted on.
#[derive(Debug, Clone)]
pub struct WaveCanvas {
    spec: WaveformSpec,
    surface: CellSurface,
}

impl WaveCanvas {
    /// Creates the canvas and paints the idle waveform.
    pub fn new(spec: WaveformSpec) -> Self {
        let mut canvas = WaveCanvas {
            spec,
            surface: CellSurface::new(spec.width, spec.height, CANVAS_BG),
        };
        canvas.repaint(None);
        canvas
    }

    /// Repaints the base waveform, then the progress overlay when playing.
    ///
    /// Repainting from scratch each frame keeps the overlay's brightness
    /// constant instead of compounding across ticks.
    pub fn repaint(&mut self, progress: Option<f32>) {
        waveform::paint(&mut self.surface, &self.spec);
        if let Some(progress) = progress {
            waveform::paint_progress_overlay(&mut self.surface, progress);
        }
    }

    /// Re-derives the canvas for new dimensions, keeping the seed.
    pub fn resize(&mut self, width: u16, height: u16, progress: Option<f32>) {
        self.spec = WaveformSpec::new(width, height, self.spec.seed);
        self.repaint(progress);
    }

    pub fn surface(&self) -> &CellSurface {
        &self.surface
    }
}

/// Mapping from card id to its canvas, established once at setup.
///
/// The controller resolves targets only through this map; an id without a
/// canvas simply cannot be played.
#[derive(Debug, Default)]
pub struct CanvasMap {
    canvases: HashMap<CardId, WaveCanvas>,
}

impl CanvasMap {
    pub fn new() -> Self {
        CanvasMap::default()
    }

    pub fn insert(&mut self, id: CardId, canvas: WaveCanvas) {
        self.canvases.insert(id, canvas);
    }

    pub fn get(&self, id: &CardId) -> Option<&WaveCanvas> {
        self.canvases.get(id)
    }

    pub fn resolve_mut(&mut self, id: &CardId) -> Option<&mut WaveCanvas> {
        self.canvases.get_mut(id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&CardId, &mut WaveCanvas)> {
        self.canvases.iter_mut()
    }
}

/// The single mutable playback state, owned by [`PlaybackController`].
///
/// Invariant: `playing` implies `active` is present, and the only writers
/// are the controller's own transitions.
#[derive(Debug, Default)]
struct PlaybackSession {
    active: Option<CardId>,
    playing: bool,
    tick: Option<TaskHandle>,
    watchdog: Option<TaskHandle>,
    progress: f32,
}

/// Enforces the at-most-one-playing invariant and drives the tick loop.
#[derive(Debug)]
pub struct PlaybackController {
    session: PlaybackSession,
    preview_duration: Duration,
}

impl PlaybackController {
    pub fn new(preview_duration: Duration) -> Self {
        PlaybackController {
            session: PlaybackSession::default(),
            preview_duration,
        }
    }

    pub fn active_card(&self) -> Option<&CardId> {
        self.session.active.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.session.playing
    }

    /// Whether `id` is the card currently playing.
    pub fn is_card_playing(&self, id: &CardId) -> bool {
        self.session.playing && self.session.active.as_ref() == Some(id)
    }

    pub fn progress(&self) -> f32 {
        self.session.progress
    }

    /// The toggle operation: stops `id` if it is playing, otherwise starts
    /// it (tearing down whichever card was playing first).
    ///
    /// An id with no canvas is silently ignored without mutating any state.
    pub fn toggle<E: From<PlaybackEvent>>(
        &mut self,
        id: &CardId,
        canvases: &mut CanvasMap,
        scheduler: &mut Scheduler<E>,
        now: Instant,
    ) {
        if canvases.get(id).is_none() {
            tracing::debug!("No canvas for card '{id}', ignoring toggle");
            return;
        }

        if self.is_card_playing(id) {
            tracing::debug!("Stopping preview of '{id}'");
            self.stop(canvases, scheduler);
        } else {
            tracing::debug!("Starting preview of '{id}'");
            self.start(id, canvases, scheduler, now);
        }
    }

    /// Dispatches a drained scheduler event.
    pub fn handle_event<E: From<PlaybackEvent>>(
        &mut self,
        event: PlaybackEvent,
        canvases: &mut CanvasMap,
        scheduler: &mut Scheduler<E>,
    ) {
        match event {
            PlaybackEvent::Tick(id) => self.on_tick(&id, canvases, scheduler),
            PlaybackEvent::PreviewElapsed(id) => self.on_preview_elapsed(&id, canvases, scheduler),
        }
    }

    /// Stop transition: releases both registrations, clears the session and
    /// repaints the stopped card without its overlay.
    ///
    /// Safe to call when nothing is playing.
    fn stop<E: From<PlaybackEvent>>(
        &mut self,
        canvases: &mut CanvasMap,
        scheduler: &mut Scheduler<E>,
    ) {
        if let Some(handle) = self.session.tick.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.session.watchdog.take() {
            scheduler.cancel(handle);
        }
        if let Some(previous) = self.session.active.take() {
            if let Some(canvas) = canvases.resolve_mut(&previous) {
                canvas.repaint(None);
            }
        }
        self.session.playing = false;
        self.session.progress = 0.0;
    }

    /// Start transition: the previous card is fully stopped before any state
    /// for the new card is written, so no old-id tick or watchdog can
    /// interleave between the two halves.
    fn start<E: From<PlaybackEvent>>(
        &mut self,
        id: &CardId,
        canvases: &mut CanvasMap,
        scheduler: &mut Scheduler<E>,
        now: Instant,
    ) {
        if self.session.playing {
            self.stop(canvases, scheduler);
        }

        self.session.active = Some(id.clone());
        self.session.playing = true;
        self.session.progress = 0.0;

        if let Some(canvas) = canvases.resolve_mut(id) {
            canvas.repaint(Some(0.0));
        }
        self.session.tick = Some(scheduler.request_frame(PlaybackEvent::Tick(id.clone()).into()));
        self.session.watchdog = Some(scheduler.set_timeout(
            now,
            self.preview_duration,
            PlaybackEvent::PreviewElapsed(id.clone()).into(),
        ));
    }

    /// One animation frame.
    ///
    /// The guard re-checks the session even though stop cancels the tick
    /// handle: a registration drained in the same batch as the toggle that
    /// killed it would otherwise fire into a superseded session.
    fn on_tick<E: From<PlaybackEvent>>(
        &mut self,
        id: &CardId,
        canvases: &mut CanvasMap,
        scheduler: &mut Scheduler<E>,
    ) {
        if !self.is_card_playing(id) {
            tracing::trace!("Discarding stale tick for '{id}'");
            return;
        }

        self.session.progress = (self.session.progress + PROGRESS_STEP).min(1.0);
        if let Some(canvas) = canvases.resolve_mut(id) {
            canvas.repaint(Some(self.session.progress));
        }

        if self.session.progress < 1.0 {
            self.session.tick =
                Some(scheduler.request_frame(PlaybackEvent::Tick(id.clone()).into()));
        } else {
            // visual progress saturates here; the logical playing state
            // persists until the watchdog or a user toggle clears it
            self.session.tick = None;
        }
    }

    /// The watchdog fired: stop `id` if it is still the active card.
    fn on_preview_elapsed<E: From<PlaybackEvent>>(
        &mut self,
        id: &CardId,
        canvases: &mut CanvasMap,
        scheduler: &mut Scheduler<E>,
    ) {
        if self.session.active.as_ref() != Some(id) {
            tracing::trace!("Discarding stale watchdog for '{id}'");
            return;
        }
        tracing::debug!("Preview duration elapsed for '{id}', auto-stopping");
        self.session.watchdog = None;
        self.stop(canvases, scheduler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_EPSILON: f32 = 1e-6;

    fn canvas_map(ids: &[&str]) -> CanvasMap {
        let mut map = CanvasMap::new();
        for (index, id) in ids.iter().enumerate() {
            map.insert(
                CardId::new(*id),
                WaveCanvas::new(WaveformSpec::new(30, 4, index as f32)),
            );
        }
        map
    }

    fn controller() -> PlaybackController {
        PlaybackController::new(DEFAULT_PREVIEW_DURATION)
    }

    #[test]
    fn test_toggle_starts_then_stops() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();
        let a = CardId::new("a");

        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        assert!(controller.is_card_playing(&a));
        assert_eq!(scheduler.pending(), 2); // tick + watchdog

        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        assert!(!controller.is_playing());
        assert!(controller.active_card().is_none());
        assert_eq!(controller.progress(), 0.0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_unknown_card_is_ignored() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();

        controller.toggle(
            &CardId::new("ghost"),
            &mut canvases,
            &mut scheduler,
            Instant::now(),
        );
        assert!(!controller.is_playing());
        assert!(controller.active_card().is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_at_most_one_card_playing() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a", "b", "c"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();

        for id in ["a", "b", "c", "b"] {
            controller.toggle(&CardId::new(id), &mut canvases, &mut scheduler, now);
            assert!(controller.is_playing());
            assert_eq!(controller.active_card(), Some(&CardId::new(id)));
            // one tick and one watchdog for the active card, nothing else
            assert_eq!(scheduler.pending(), 2);
        }
    }

    #[test]
    fn test_switch_cancels_previous_tick() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a", "b"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();
        let a = CardId::new("a");
        let b = CardId::new("b");

        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        controller.toggle(&b, &mut canvases, &mut scheduler, now);

        // drain one frame: no tick for the superseded card may fire
        let due = scheduler.drain_due(now);
        assert_eq!(due, vec![PlaybackEvent::Tick(b.clone())]);
        for event in due {
            controller.handle_event(event, &mut canvases, &mut scheduler);
        }
        assert!(controller.is_card_playing(&b));
        assert!((controller.progress() - PROGRESS_STEP).abs() < STEP_EPSILON);
    }

    #[test]
    fn test_stale_tick_is_discarded_without_reregistering() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();
        let a = CardId::new("a");

        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        // the frame is drained before the user stops: the tick event now
        // exists outside the scheduler and must hit the guard
        let due = scheduler.drain_due(now);
        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        for event in due {
            controller.handle_event(event, &mut canvases, &mut scheduler);
        }

        assert!(!controller.is_playing());
        assert_eq!(controller.progress(), 0.0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_watchdog_auto_stops() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();
        let a = CardId::new("a");

        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        let later = now + DEFAULT_PREVIEW_DURATION;
        for event in scheduler.drain_due(later) {
            controller.handle_event(event, &mut canvases, &mut scheduler);
        }

        assert!(!controller.is_playing());
        assert!(controller.active_card().is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_stale_watchdog_after_switch_is_discarded() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a", "b"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();

        controller.toggle(&CardId::new("a"), &mut canvases, &mut scheduler, now);
        // a stale watchdog event for "a", as if it escaped cancellation
        controller.toggle(&CardId::new("b"), &mut canvases, &mut scheduler, now);
        controller.handle_event(
            PlaybackEvent::PreviewElapsed(CardId::new("a")),
            &mut canvases,
            &mut scheduler,
        );

        assert!(controller.is_card_playing(&CardId::new("b")));
    }

    #[test]
    fn test_progress_saturates_and_stops_reregistering() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();
        let a = CardId::new("a");

        controller.toggle(&a, &mut canvases, &mut scheduler, now);

        let mut frames = 0;
        loop {
            let due: Vec<_> = scheduler
                .drain_due(now)
                .into_iter()
                .filter(|event| matches!(event, PlaybackEvent::Tick(_)))
                .collect();
            if due.is_empty() {
                break;
            }
            for event in due {
                controller.handle_event(event, &mut canvases, &mut scheduler);
            }
            frames += 1;
            assert!(frames <= 200, "animation never saturated");
        }

        // 0.01 per tick; float accumulation may need one extra frame
        assert!((100..=101).contains(&frames), "saturated after {frames} frames");
        assert_eq!(controller.progress(), 1.0);
        // still logically playing: only the watchdog remains outstanding
        assert!(controller.is_card_playing(&a));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_toggle_a_b_b_leaves_idle() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a", "b"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();

        controller.toggle(&CardId::new("a"), &mut canvases, &mut scheduler, now);
        controller.toggle(&CardId::new("b"), &mut canvases, &mut scheduler, now);
        controller.toggle(&CardId::new("b"), &mut canvases, &mut scheduler, now);

        assert!(controller.active_card().is_none());
        assert!(!controller.is_playing());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_tick_repaints_with_overlay() {
        let mut controller = controller();
        let mut canvases = canvas_map(&["a"]);
        let mut scheduler: Scheduler<PlaybackEvent> = Scheduler::new();
        let now = Instant::now();
        let a = CardId::new("a");

        let idle_row: Vec<_> = canvases.get(&a).unwrap().surface().row(0).to_vec();

        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        for _ in 0..10 {
            for event in scheduler.drain_due(now) {
                controller.handle_event(event, &mut canvases, &mut scheduler);
            }
        }

        let playing_row: Vec<_> = canvases.get(&a).unwrap().surface().row(0).to_vec();
        assert_ne!(idle_row, playing_row, "overlay left no visible trace");

        // stopping repaints the idle waveform
        controller.toggle(&a, &mut canvases, &mut scheduler, now);
        let stopped_row: Vec<_> = canvases.get(&a).unwrap().surface().row(0).to_vec();
        assert_eq!(idle_row, stopped_row);
    }
}
