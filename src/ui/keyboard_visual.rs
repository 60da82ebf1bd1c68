//! Visual movement key pad rendering

use super::app::KeyPadState;
use super::theme::ThemeColors;
use crate::keyboard::{KeyMapping, LogicalKey};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

const KEY_WIDTH: u16 = 7;
const KEY_GAP: u16 = 1;

/// The four movement roles laid out like W/A/S/D
pub struct KeyboardVisual<'a> {
    pad: &'a KeyPadState,
    mapping: &'a KeyMapping,
    /// Keys a pending pairing is waiting for
    expected: &'a [LogicalKey],
    colors: ThemeColors,
}

impl<'a> KeyboardVisual<'a> {
    pub fn new(
        pad: &'a KeyPadState,
        mapping: &'a KeyMapping,
        expected: &'a [LogicalKey],
        colors: ThemeColors,
    ) -> Self {
        Self {
            pad,
            mapping,
            expected,
            colors,
        }
    }

    fn key_style(&self, key: LogicalKey) -> (Color, Color, bool) {
        if self.pad.is_down(key) {
            (self.colors.key_on, self.colors.key_text_on, true)
        } else if self.expected.contains(&key) {
            (self.colors.key_expected, self.colors.key_text_on, true)
        } else if self.pad.press_count(key) > 0 {
            (self.colors.key_used, self.colors.key_text, false)
        } else {
            (self.colors.key_off, self.colors.key_text, false)
        }
    }

    fn render_key(&self, buf: &mut Buffer, area: Rect, x: u16, y: u16, key: LogicalKey) {
        let (bg, fg, bold) = self.key_style(key);
        let mut style = Style::default().fg(fg).bg(bg);
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if y < area.y + area.height && x + KEY_WIDTH <= area.x + area.width {
            let label = self.mapping.key_for(key).as_str();
            buf.set_string(
                x,
                y,
                format!("{:^w$}", label, w = KEY_WIDTH as usize),
                style,
            );
        }
    }
}

impl<'a> Widget for KeyboardVisual<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pad_width = KEY_WIDTH * 3 + KEY_GAP * 2;
        if area.width < pad_width || area.height < 2 {
            buf.set_string(
                area.x,
                area.y,
                "Window too small",
                Style::default().fg(self.colors.dim),
            );
            return;
        }

        let x0 = area.x + (area.width - pad_width) / 2;
        let y0 = area.y + area.height.saturating_sub(2) / 2;
        let column = |i: u16| x0 + i * (KEY_WIDTH + KEY_GAP);

        self.render_key(buf, area, column(1), y0, LogicalKey::Forward);
        self.render_key(buf, area, column(0), y0 + 1, LogicalKey::Left);
        self.render_key(buf, area, column(1), y0 + 1, LogicalKey::Back);
        self.render_key(buf, area, column(2), y0 + 1, LogicalKey::Right);
    }
}
