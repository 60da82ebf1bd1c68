//! Custom TUI widgets

use super::theme::timing_color;
use crate::analysis::{ResultStatus, TestResult};
use crate::detector::{CancelReason, ClassifiedRecord};
use crate::keyboard::{Axis, KeyMapping, LogicalKey};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Widget for displaying result lines
pub struct ResultsPanel<'a> {
    results: &'a [TestResult],
    title: &'a str,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(results: &'a [TestResult], title: &'a str) -> Self {
        Self { results, title }
    }

    fn status_color(status: ResultStatus) -> Color {
        match status {
            ResultStatus::Ok => Color::Green,
            ResultStatus::Warning => Color::Yellow,
            ResultStatus::Error => Color::Red,
            ResultStatus::Info => Color::Cyan,
        }
    }

    fn status_symbol(status: ResultStatus) -> &'static str {
        match status {
            ResultStatus::Ok => "[OK]",
            ResultStatus::Warning => "[!!]",
            ResultStatus::Error => "[XX]",
            ResultStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        for result in self.results {
            if y >= inner.y + inner.height {
                break;
            }

            let color = Self::status_color(result.status);
            let symbol = Self::status_symbol(result.status);

            let line = Line::from(vec![
                Span::styled(format!("{} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{}: ", result.label),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled(&result.value, Style::default().fg(color)),
            ]);

            buf.set_line(inner.x, y, &line, inner.width);
            y += 1;
        }
    }
}

/// Latest record feedback plus per-axis waiting indicators
pub struct FeedbackPanel<'a> {
    record: Option<&'a ClassifiedRecord>,
    cancelled: Option<(Axis, CancelReason)>,
    waiting: &'a [Option<LogicalKey>; 2],
    mapping: &'a KeyMapping,
}

impl<'a> FeedbackPanel<'a> {
    pub fn new(
        record: Option<&'a ClassifiedRecord>,
        waiting: &'a [Option<LogicalKey>; 2],
        mapping: &'a KeyMapping,
    ) -> Self {
        Self {
            record,
            cancelled: None,
            waiting,
            mapping,
        }
    }

    pub fn cancelled(mut self, cancelled: Option<(Axis, CancelReason)>) -> Self {
        self.cancelled = cancelled;
        self
    }
}

impl<'a> Widget for FeedbackPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Feedback ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(90, 90, 110)));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let feedback = match self.record {
            Some(record) => Line::from(Span::styled(
                record.feedback(),
                Style::default()
                    .fg(timing_color(record.classification, record.color_intensity))
                    .add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                "Strafe with the movement keys, then counter-strafe",
                Style::default().fg(Color::DarkGray),
            )),
        };
        buf.set_line(inner.x, inner.y, &feedback, inner.width);

        if inner.height < 2 {
            return;
        }
        let mut spans = Vec::new();
        for axis in Axis::ALL {
            let text = match self.waiting[axis.index()] {
                Some(expected) => format!(
                    " {} waiting for {} ",
                    axis,
                    self.mapping.key_for(expected)
                ),
                None => format!(" {} idle ", axis),
            };
            let style = if self.waiting[axis.index()].is_some() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(text, style));
        }
        if let Some((axis, reason)) = self.cancelled {
            spans.push(Span::styled(
                format!(" last {} dropped: {} ", axis, reason),
                Style::default().fg(Color::DarkGray),
            ));
        }
        buf.set_line(inner.x, inner.y + 1, &Line::from(spans), inner.width);
    }
}

/// Recent records, newest first, coloured by timing
pub struct RecordList<'a> {
    records: &'a [ClassifiedRecord],
}

impl<'a> RecordList<'a> {
    pub fn new(records: &'a [ClassifiedRecord]) -> Self {
        Self { records }
    }
}

impl<'a> Widget for RecordList<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Recent counter-strafes ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.records.is_empty() {
            buf.set_string(
                inner.x,
                inner.y,
                "No records yet",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        for (i, record) in self.records.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let color = timing_color(record.classification, record.color_intensity);
            let events = record
                .event_log
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let line = Line::from(vec![
                Span::styled(
                    format!("{:>9.3}s ", record.event_timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("[{}] ", record.axis), Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:+7.1} ms {:<8}", record.time_diff_ms, record.classification),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(events, Style::default().fg(Color::DarkGray)),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

/// Widget for the help screen
pub struct HelpPanel;

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help - Counter-Strafe TestKit")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = [
            "",
            " NAVIGATION",
            " -----------",
            " Tab / Shift+Tab  : Switch between views",
            " q / Esc          : Quit application",
            "",
            " CONTROLS",
            " -----------",
            " r                : Clear history and key state",
            " t                : Cycle filter threshold (20-200 ms)",
            " w                : Cycle statistics window (10-200 records)",
            " e                : Export report to JSON",
            " ?                : Show this help",
            "",
            " READING THE RESULTS",
            " -----------",
            " Release a movement key and press its opposite.",
            " Offset = press time - release time.",
            " Perfect : within 2 ms",
            " Early   : opposite key went down before the release",
            " Late    : opposite key went down after the release",
        ];

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let style = if line.starts_with(' ') && line.contains("---") {
                Style::default().fg(Color::DarkGray)
            } else if line.starts_with(' ')
                && line.chars().nth(1).is_some_and(|c| c.is_uppercase())
                && line.trim() == line.trim().to_uppercase()
            {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    state: &'a str,
    view: &'a str,
    elapsed: &'a str,
    events: u64,
    settings: Option<&'a str>,
    message: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a str, view: &'a str, elapsed: &'a str, events: u64) -> Self {
        Self {
            state,
            view,
            elapsed,
            events,
            settings: None,
            message: None,
        }
    }

    pub fn settings(mut self, settings: &'a str) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            buf.set_string(x, area.y, " ", bg_style);
        }

        // Left side: state, view and settings
        let left = match self.settings {
            Some(settings) => format!(" {} | {} | {} ", self.state, self.view, settings),
            None => format!(" {} | {} ", self.state, self.view),
        };
        buf.set_string(area.x, area.y, &left, bg_style.add_modifier(Modifier::BOLD));

        // Center: message if any
        if let Some(msg) = self.message {
            let msg_style = Style::default().bg(Color::DarkGray).fg(Color::Yellow);
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.len() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, msg_style);
        }

        // Right side: elapsed time and events
        let right = format!(" {} | Events: {} ", self.elapsed, self.events);
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

/// Tab bar widget
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize) -> Self {
        Self { tabs, selected }
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut x = area.x;

        for (i, tab) in self.tabs.iter().enumerate() {
            let style = if i == self.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };

            let label = format!(" {} ", tab);
            let width = label.len() as u16;

            if x + width <= area.x + area.width {
                buf.set_string(x, area.y, &label, style);
                x += width;

                // Separator
                if i < self.tabs.len() - 1 && x < area.x + area.width {
                    buf.set_string(x, area.y, "|", Style::default().fg(Color::DarkGray));
                    x += 1;
                }
            }
        }

        // Fill rest with background
        for fill_x in x..area.x + area.width {
            buf.set_string(fill_x, area.y, " ", Style::default().bg(Color::DarkGray));
        }
    }
}
