//! Frame rendering for an LED matrix.
//!
//! The renderer walks every pixel of the matrix, evaluates the current program
//! with `(t, index, x, y)`, maps the value to a color and hands the finished
//! frame to an [`OutputDriver`]. Timing of the frames is left to the caller;
//! the renderer only advances its own clock by one frame period per frame.

use smart_leds::brightness;

use crate::Real;
use crate::color::{Rgb, interpolate};
use crate::engine::Engine;
use crate::settings::Settings;

/// LED strip or matrix driver.
///
/// Implement this trait for the hardware (WS2812 over RMT, SPI, ...) or for a
/// test double.
pub trait OutputDriver {
    /// Write one frame, in strip order.
    fn write(&mut self, colors: &[Rgb]);
}

/// Physical wiring of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLayout {
    pub width: usize,
    pub height: usize,
    /// Rows alternate direction. Even rows run right to left, odd rows left to right.
    pub serpentine: bool,
}

impl MatrixLayout {
    pub const fn new(width: usize, height: usize, serpentine: bool) -> Self {
        Self {
            width,
            height,
            serpentine,
        }
    }

    /// The 8x8 serpentine panel of the reference board.
    pub const fn serpentine_8x8() -> Self {
        Self::new(8, 8, true)
    }

    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Strip index of the pixel at column `x`, row `y`.
    pub const fn index(&self, x: usize, y: usize) -> usize {
        if self.serpentine && y % 2 == 0 {
            y * self.width + (self.width - 1 - x)
        } else {
            y * self.width + x
        }
    }
}

/// Renders frames of up to `PIXELS` LEDs.
pub struct Renderer<const PIXELS: usize> {
    layout: MatrixLayout,
    frame: [Rgb; PIXELS],
    time: Real,
}

impl<const PIXELS: usize> Renderer<PIXELS> {
    /// Pixels of `layout` whose strip index is `PIXELS` or more are never drawn.
    pub fn new(layout: MatrixLayout) -> Self {
        Self {
            layout,
            frame: [Rgb::default(); PIXELS],
            time: 0.0,
        }
    }

    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }

    /// Seconds of animation rendered so far.
    pub fn time(&self) -> Real {
        self.time
    }

    pub fn reset_clock(&mut self) {
        self.time = 0.0;
    }

    /// The last frame, before brightness scaling.
    pub fn frame(&self) -> &[Rgb] {
        &self.frame
    }

    /// Render one frame and write it to `driver`.
    pub fn render_frame<const CAPACITY: usize, D: OutputDriver>(
        &mut self,
        engine: &Engine<CAPACITY>,
        settings: &Settings,
        driver: &mut D,
    ) {
        let color1 = settings.color1();
        let color2 = settings.color2();

        for y in 0..self.layout.height {
            for x in 0..self.layout.width {
                let index = self.layout.index(x, y);
                let Some(pixel) = self.frame.get_mut(index) else {
                    continue;
                };
                let value = engine.eval(self.time, index as Real, x as Real, y as Real);
                *pixel = interpolate(color1, color2, value);
            }
        }

        let mut output = [Rgb::default(); PIXELS];
        for (out, color) in output
            .iter_mut()
            .zip(brightness(self.frame.iter().copied(), settings.brightness()))
        {
            *out = color;
        }
        driver.write(&output);

        self.time += settings.frame_time();
    }
}
