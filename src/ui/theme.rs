//! Theme color definitions for the UI
//!
//! Provides dark and light color palettes that can be switched at runtime,
//! plus the timing colours used for classified records.

use crate::config::Theme;
use crate::detector::Classification;
use crate::utils::lerp_rgb;
use ratatui::style::Color;

/// Colour of a Perfect record
pub const PERFECT_RGB: (u8, u8, u8) = (144, 238, 144);
/// Early records fade from light blue to dark blue with intensity
pub const EARLY_RGB: [(u8, u8, u8); 2] = [(173, 216, 230), (0, 0, 139)];
/// Late records fade from pink to dark red with intensity
pub const LATE_RGB: [(u8, u8, u8); 2] = [(255, 182, 193), (139, 0, 0)];

/// RGB colour for a record's classification and intensity
pub fn timing_rgb(classification: Classification, intensity: f64) -> (u8, u8, u8) {
    match classification {
        Classification::Perfect => PERFECT_RGB,
        Classification::Early => lerp_rgb(EARLY_RGB[0], EARLY_RGB[1], intensity),
        Classification::Late => lerp_rgb(LATE_RGB[0], LATE_RGB[1], intensity),
    }
}

/// Terminal colour for a record's classification and intensity
pub fn timing_color(classification: Classification, intensity: f64) -> Color {
    let (r, g, b) = timing_rgb(classification, intensity);
    Color::Rgb(r, g, b)
}

/// Colour palette for the key pad
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Dimmed/secondary text
    pub dim: Color,
    /// Key idle (unpressed) background
    pub key_off: Color,
    /// Key pressed background
    pub key_on: Color,
    /// Key previously used background
    pub key_used: Color,
    /// Key the detector is waiting for
    pub key_expected: Color,
    /// Key label text (idle)
    pub key_text: Color,
    /// Key label text (pressed)
    pub key_text_on: Color,
}

impl ThemeColors {
    /// Create a color palette for the given theme variant
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            dim: Color::Rgb(90, 90, 110),
            key_off: Color::Rgb(40, 40, 50),
            key_on: Color::Rgb(80, 200, 120),
            key_used: Color::Rgb(55, 55, 70),
            key_expected: Color::Rgb(240, 180, 80),
            key_text: Color::Rgb(180, 180, 190),
            key_text_on: Color::Rgb(20, 20, 25),
        }
    }

    /// Light theme - high contrast for bright terminals
    pub fn light() -> Self {
        Self {
            dim: Color::Rgb(130, 130, 150),
            key_off: Color::Rgb(220, 220, 228),
            key_on: Color::Rgb(30, 150, 70),
            key_used: Color::Rgb(200, 200, 212),
            key_expected: Color::Rgb(180, 120, 0),
            key_text: Color::Rgb(50, 50, 60),
            key_text_on: Color::Rgb(255, 255, 255),
        }
    }
}
