//! Runtime settings of the LED controller.
//!
//! These are the values the control channel writes and the render loop reads:
//! the program text, frame rate, global brightness and the two gradient colors.
//! `Settings` derives `serde` so the storage layer can persist it in any format.

use core::fmt;

use heapless::Vec;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{Rgb, rgb_from_array};
use crate::{MAX_PROGRAM_LEN, Real};

pub const DEFAULT_PROGRAM: &[u8] = b"sin(2*t-hypot(x-3.5,y-3.5))";
pub const DEFAULT_FRAME_RATE: u8 = 60;
pub const DEFAULT_BRIGHTNESS: u8 = 25;
pub const DEFAULT_COLOR1: [u8; 3] = [251, 72, 196];
pub const DEFAULT_COLOR2: [u8; 3] = [63, 255, 33];

/// Rejected settings write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// A color write was not exactly three bytes.
    BadColorLength { len: usize },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::BadColorLength { len } => {
                write!(f, "Color must be 3 bytes, got {len}")
            }
        }
    }
}

impl core::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    program: Vec<u8, MAX_PROGRAM_LEN>,
    frame_rate: u8,
    brightness: u8,
    color1: [u8; 3],
    color2: [u8; 3],
}

impl Settings {
    /// The program text, without terminator.
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    /// Store a new program.
    ///
    /// Copies up to the first NUL byte and silently truncates to
    /// [`MAX_PROGRAM_LEN`] bytes.
    pub fn set_program(&mut self, bytes: &[u8]) {
        let end = bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(bytes.len())
            .min(MAX_PROGRAM_LEN);
        self.program.clear();
        // Fits: `end` is at most the capacity.
        let _ = self.program.extend_from_slice(&bytes[..end]);
        debug!("program set ({} bytes)", end);
    }

    pub fn frame_rate(&self) -> u8 {
        self.frame_rate
    }

    /// Set frames per second; `0` is stored as `1`.
    pub fn set_frame_rate(&mut self, fps: u8) {
        self.frame_rate = fps.max(1);
        debug!("frame rate set to {}", self.frame_rate);
    }

    /// Seconds per frame.
    pub fn frame_time(&self) -> Real {
        1.0 / self.frame_rate.max(1) as Real
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
        debug!("brightness set to {brightness}");
    }

    /// Color shown for an output of `1`.
    pub fn color1(&self) -> Rgb {
        rgb_from_array(self.color1)
    }

    /// Color shown for an output of `-1`.
    pub fn color2(&self) -> Rgb {
        rgb_from_array(self.color2)
    }

    pub fn set_color1(&mut self, bytes: &[u8]) -> Result<(), SettingsError> {
        self.color1 = color_from_bytes(bytes)?;
        debug!("color1 set to {:?}", self.color1);
        Ok(())
    }

    pub fn set_color2(&mut self, bytes: &[u8]) -> Result<(), SettingsError> {
        self.color2 = color_from_bytes(bytes)?;
        debug!("color2 set to {:?}", self.color2);
        Ok(())
    }
}

fn color_from_bytes(bytes: &[u8]) -> Result<[u8; 3], SettingsError> {
    <[u8; 3]>::try_from(bytes).map_err(|_| SettingsError::BadColorLength { len: bytes.len() })
}

impl Default for Settings {
    fn default() -> Self {
        let mut settings = Self {
            program: Vec::new(),
            frame_rate: DEFAULT_FRAME_RATE,
            brightness: DEFAULT_BRIGHTNESS,
            color1: DEFAULT_COLOR1,
            color2: DEFAULT_COLOR2,
        };
        settings.set_program(DEFAULT_PROGRAM);
        settings
    }
}
