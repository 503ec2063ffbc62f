//! Synthetic waveform rendering for preview cards.
//!
//! Cards carry no real audio, so the waveform is derived from a per-card seed:
//! identical seed and width always paint identical bars, which keeps the
//! storefront stable across redraws and makes the geometry testable.

pub mod surface;

pub use surface::{CellSurface, Composite, FillStyle, Gradient, Rgb, Surface};

/// Lower clamp for generated amplitudes.
pub const AMPLITUDE_FLOOR: f32 = 0.1;
/// Upper clamp for generated amplitudes.
pub const AMPLITUDE_CEIL: f32 = 0.9;

/// Horizontal pixels consumed per bar (bar body plus a one-pixel gap).
const PIXELS_PER_BAR: u16 = 3;
/// Exponential smoothing factor applied to the noise signal.
const SMOOTHING: f32 = 0.1;
/// Opacity of the progress overlay.
const OVERLAY_ALPHA: f32 = 0.3;

/// Immutable inputs for one waveform paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformSpec {
    /// Surface width in pixels, > 0.
    pub width: u16,
    /// Surface height in pixels, > 0.
    pub height: u16,
    /// Seed for the pseudo-random amplitude sequence.
    pub seed: f32,
}

impl WaveformSpec {
    pub fn new(width: u16, height: u16, seed: f32) -> Self {
        WaveformSpec {
            width,
            height,
            seed,
        }
    }

    /// Number of bars painted for this width.
    pub fn point_count(&self) -> usize {
        (self.width / PIXELS_PER_BAR) as usize
    }
}

/// Generates a smooth, bounded, seed-deterministic amplitude sequence.
///
/// Starts from a 0.5 baseline and smooths toward a `sin * cos` noise signal,
/// clamping every value to [[`AMPLITUDE_FLOOR`], [`AMPLITUDE_CEIL`]]. No
/// entropy source is involved: the same `(point_count, seed)` pair always
/// yields the same sequence element-for-element.
pub fn generate_amplitude_sequence(point_count: usize, seed: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(point_count);
    let mut value = 0.5_f32;

    for i in 0..point_count {
        let noise = (seed + i as f32 * 0.1).sin() * (seed + i as f32 * 0.05).cos();
        value += (noise - value) * SMOOTHING;
        value = value.clamp(AMPLITUDE_FLOOR, AMPLITUDE_CEIL);
        data.push(value);
    }

    data
}

/// The fixed bar gradient: indigo at the edges, violet in the middle.
fn bar_gradient() -> Gradient {
    Gradient::new(vec![
        (0.0, Rgb::new(102, 126, 234)),
        (0.5, Rgb::new(118, 75, 162)),
        (1.0, Rgb::new(102, 126, 234)),
    ])
}

/// Paints the full waveform onto `surface`.
///
/// Resizes the surface to the spec's dimensions, then draws one vertically
/// centered bar per amplitude value, leaving a one-pixel gap between bars.
pub fn paint(surface: &mut dyn Surface, spec: &WaveformSpec) {
    surface.set_size(spec.width, spec.height);

    let point_count = spec.point_count();
    if point_count == 0 {
        return;
    }
    let data = generate_amplitude_sequence(point_count, spec.seed);

    let width = spec.width as f32;
    let height = spec.height as f32;
    let bar_width = width / point_count as f32;
    let fill = FillStyle::Horizontal(bar_gradient());

    for (i, value) in data.iter().enumerate() {
        let bar_height = value * height / 2.0;
        let x = i as f32 * bar_width;
        let y = (height - bar_height) / 2.0;
        surface.fill_rect(x, y, bar_width - 1.0, bar_height, &fill);
    }
}

/// Paints the playback progress overlay onto `surface`.
///
/// Lightens the strip `[0, width * progress]` across the full height. The
/// composite mode is switched under a save/restore pair so later paints see
/// the surface exactly as before the call.
pub fn paint_progress_overlay(surface: &mut dyn Surface, progress: f32) {
    let progress = progress.clamp(0.0, 1.0);
    let progress_width = surface.width() as f32 * progress;
    let height = surface.height() as f32;

    surface.save();
    surface.set_composite(Composite::Lighten);
    surface.fill_rect(
        0.0,
        0.0,
        progress_width,
        height,
        &FillStyle::Solid {
            color: Rgb::new(255, 255, 255),
            alpha: OVERLAY_ALPHA,
        },
    );
    surface.restore();
}
