//! Abstract 2-D drawing surface for waveform cards.
//!
//! Surfaces are addressed in "pixels" that map one-to-one onto terminal cells.
//! The painter only needs rectangle fills, a lightening blend mode, and
//! save/restore of drawing state, so the contract stays deliberately small.

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Linear interpolation between two colors, `t` in [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Screen-blends `src` (scaled by `alpha`) on top of this color.
    ///
    /// Screen blending never darkens, which is what the progress overlay
    /// relies on to stay visible over both bars and background.
    fn screen(self, src: Rgb, alpha: f32) -> Rgb {
        let blend = |dst: u8, src: u8| {
            let s = src as f32 * alpha.clamp(0.0, 1.0);
            let d = dst as f32;
            (255.0 - (255.0 - d) * (255.0 - s) / 255.0).round() as u8
        };
        Rgb::new(
            blend(self.r, src.r),
            blend(self.g, src.g),
            blend(self.b, src.b),
        )
    }
}

/// Horizontal color gradient evaluated across the surface width.
///
/// Stop positions are fractions of the width in [0, 1] and must be sorted
/// ascending. Colors between stops are linearly interpolated.
#[derive(Debug, Clone)]
pub struct Gradient {
    stops: Vec<(f32, Rgb)>,
}

impl Gradient {
    pub fn new(stops: Vec<(f32, Rgb)>) -> Self {
        debug_assert!(stops.windows(2).all(|w| w[0].0 <= w[1].0));
        Gradient { stops }
    }

    /// Color at horizontal position `t` in [0, 1].
    pub fn at(&self, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        match self.stops.first() {
            None => Rgb::new(0, 0, 0),
            Some(&(first_pos, first_color)) => {
                if t <= first_pos {
                    return first_color;
                }
                for pair in self.stops.windows(2) {
                    let (lo, lo_color) = pair[0];
                    let (hi, hi_color) = pair[1];
                    if t <= hi {
                        let span = hi - lo;
                        let local = if span > 0.0 { (t - lo) / span } else { 0.0 };
                        return lo_color.lerp(hi_color, local);
                    }
                }
                self.stops.last().map(|&(_, c)| c).unwrap_or(first_color)
            }
        }
    }
}

/// Fill style for rectangle fills.
#[derive(Debug, Clone)]
pub enum FillStyle {
    /// Uniform color with an opacity in [0, 1].
    Solid { color: Rgb, alpha: f32 },
    /// Horizontal gradient spanning the full surface width, fully opaque.
    Horizontal(Gradient),
}

/// Composite (blend) mode for subsequent fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Alpha-blend the fill over existing pixels.
    #[default]
    SourceOver,
    /// Lighten existing pixels (screen blend).
    Lighten,
}

/// Opaque 2-D drawing target for one card's waveform.
///
/// Mirrors the subset of an immediate-mode canvas the renderer needs: set
/// pixel dimensions, fill rectangles, switch blend mode, save/restore state.
pub trait Surface {
    /// Resizes the surface and clears it to its background color.
    fn set_size(&mut self, width: u16, height: u16);
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    /// Fills the rectangle `[x, x+w) x [y, y+h)` under the current composite
    /// mode. Coordinates are in pixels and may be fractional; the covered
    /// pixel span is rounded. Out-of-bounds regions are clipped.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: &FillStyle);
    fn set_composite(&mut self, mode: Composite);
    /// Pushes the current drawing state (composite mode) onto a stack.
    fn save(&mut self);
    /// Pops the most recently saved drawing state. No-op on an empty stack.
    fn restore(&mut self);
}

/// In-memory [`Surface`] backed by a cell-resolution color grid.
///
/// The storefront UI copies the grid into the ratatui frame one cell per
/// pixel; tests read pixels back directly.
#[derive(Debug, Clone)]
pub struct CellSurface {
    width: u16,
    height: u16,
    pixels: Vec<Rgb>,
    background: Rgb,
    composite: Composite,
    saved: Vec<Composite>,
}

impl CellSurface {
    pub fn new(width: u16, height: u16, background: Rgb) -> Self {
        CellSurface {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            background,
            composite: Composite::default(),
            saved: Vec::new(),
        }
    }

    /// Pixel at `(x, y)`. Out-of-bounds reads return the background color.
    pub fn pixel(&self, x: u16, y: u16) -> Rgb {
        if x >= self.width || y >= self.height {
            return self.background;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// One row of pixels, top to bottom.
    pub fn row(&self, y: u16) -> &[Rgb] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    fn resolve_fill(&self, fill: &FillStyle, x: usize) -> (Rgb, f32) {
        match fill {
            FillStyle::Solid { color, alpha } => (*color, *alpha),
            FillStyle::Horizontal(gradient) => {
                let span = (self.width.max(1) - 1).max(1) as f32;
                (gradient.at(x as f32 / span), 1.0)
            }
        }
    }
}

impl Surface for CellSurface {
    fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.pixels = vec![self.background; width as usize * height as usize];
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: &FillStyle) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = x.round().max(0.0) as usize;
        let y0 = y.round().max(0.0) as usize;
        let x1 = ((x + w).round() as usize).min(self.width as usize);
        let y1 = ((y + h).round() as usize).min(self.height as usize);

        for py in y0..y1 {
            for px in x0..x1 {
                let (color, alpha) = self.resolve_fill(fill, px);
                let index = py * self.width as usize + px;
                let dst = self.pixels[index];
                self.pixels[index] = match self.composite {
                    Composite::SourceOver => dst.lerp(color, alpha),
                    Composite::Lighten => dst.screen(color, alpha),
                };
            }
        }
    }

    fn set_composite(&mut self, mode: Composite) {
        self.composite = mode;
    }

    fn save(&mut self) {
        self.saved.push(self.composite);
    }

    fn restore(&mut self) {
        if let Some(mode) = self.saved.pop() {
            self.composite = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(10, 10, 10);

    #[test]
    fn test_fill_rect_covers_rounded_span() {
        let mut surface = CellSurface::new(6, 2, BG);
        let fill = FillStyle::Solid {
            color: Rgb::new(200, 0, 0),
            alpha: 1.0,
        };
        surface.fill_rect(0.0, 0.0, 2.0, 2.0, &fill);

        assert_eq!(surface.pixel(0, 0), Rgb::new(200, 0, 0));
        assert_eq!(surface.pixel(1, 1), Rgb::new(200, 0, 0));
        assert_eq!(surface.pixel(2, 0), BG);
    }

    #[test]
    fn test_fill_rect_clips_out_of_bounds() {
        let mut surface = CellSurface::new(4, 4, BG);
        let fill = FillStyle::Solid {
            color: Rgb::new(0, 200, 0),
            alpha: 1.0,
        };
        surface.fill_rect(2.0, 2.0, 100.0, 100.0, &fill);

        assert_eq!(surface.pixel(3, 3), Rgb::new(0, 200, 0));
        // nothing outside the grid; reads past the edge return background
        assert_eq!(surface.pixel(4, 4), BG);
    }

    #[test]
    fn test_lighten_never_darkens() {
        let mut surface = CellSurface::new(2, 1, Rgb::new(100, 50, 150));
        surface.set_composite(Composite::Lighten);
        let fill = FillStyle::Solid {
            color: Rgb::new(255, 255, 255),
            alpha: 0.3,
        };
        surface.fill_rect(0.0, 0.0, 2.0, 1.0, &fill);

        let lit = surface.pixel(0, 0);
        assert!(lit.r >= 100 && lit.g >= 50 && lit.b >= 150);
        assert_ne!(lit, Rgb::new(100, 50, 150));
    }

    #[test]
    fn test_save_restore_round_trips_composite() {
        let mut surface = CellSurface::new(1, 1, BG);
        surface.save();
        surface.set_composite(Composite::Lighten);
        surface.restore();

        // back to default; a fill now replaces instead of lightening
        let fill = FillStyle::Solid {
            color: Rgb::new(0, 0, 0),
            alpha: 1.0,
        };
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, &fill);
        assert_eq!(surface.pixel(0, 0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_restore_on_empty_stack_is_noop() {
        let mut surface = CellSurface::new(1, 1, BG);
        surface.set_composite(Composite::Lighten);
        surface.restore();
        assert_eq!(surface.pixel(0, 0), BG);
    }

    #[test]
    fn test_gradient_interpolates_between_stops() {
        let gradient = Gradient::new(vec![
            (0.0, Rgb::new(0, 0, 0)),
            (1.0, Rgb::new(200, 100, 50)),
        ]);
        assert_eq!(gradient.at(0.0), Rgb::new(0, 0, 0));
        assert_eq!(gradient.at(1.0), Rgb::new(200, 100, 50));
        assert_eq!(gradient.at(0.5), Rgb::new(100, 50, 25));
    }
}
