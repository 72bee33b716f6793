//! Bipolar color mapping.
//!
//! A program output in `[-1, 1]` is turned into a color on a two-sided gradient:
//! `1` is the first color at full intensity, `-1` the second, and `0` is black.

use libm::{fmaxf, fminf};
use smart_leds::RGB8;

use crate::Real;

pub type Rgb = RGB8;

#[inline]
fn scale(color: Rgb, amount: Real) -> Rgb {
    Rgb {
        r: (color.r as Real * amount) as u8,
        g: (color.g as Real * amount) as u8,
        b: (color.b as Real * amount) as u8,
    }
}

/// Map `t` onto the gradient `b ... black ... a`.
///
/// `t` is clamped to `[-1, 1]` first; NaN clamps to `-1` and yields `b`.
/// Channels are truncated, not rounded.
pub fn interpolate(a: Rgb, b: Rgb, t: Real) -> Rgb {
    let t = fminf(fmaxf(t, -1.0), 1.0);
    if t > 0.0 { scale(a, t) } else { scale(b, -t) }
}

/// Build a color from a `[r, g, b]` triple.
pub const fn rgb_from_array(channels: [u8; 3]) -> Rgb {
    Rgb {
        r: channels[0],
        g: channels[1],
        b: channels[2],
    }
}
