pub mod keypad;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

use decalc::keypad::{Key, KEYPAD_ROW_COUNT};

use crate::App;

pub use keypad::button_rects;

const HORIZONTAL_MARGIN: u16 = 2;
const HEADER_HEIGHT: u16 = 2;
const BUTTON_HEIGHT: u16 = 3;

/// Regions of the calculator screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub display: Rect,
    pub keypad: Rect,
}

pub fn screen_layout(area: Rect, show_header: bool) -> ScreenLayout {
    let header_height = if show_header { HEADER_HEIGHT } else { 0 };
    let keypad_height = BUTTON_HEIGHT * KEYPAD_ROW_COUNT as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(1),
            Constraint::Length(keypad_height),
        ])
        .split(area);

    ScreenLayout {
        header: chunks[0],
        display: chunks[1],
        keypad: chunks[2],
    }
}

/// Key under a terminal cell, if any
pub fn hit_test(area: Rect, show_header: bool, column: u16, row: u16) -> Option<Key> {
    let layout = screen_layout(area, show_header);
    button_rects(layout.keypad)
        .into_iter()
        .find(|(rect, _)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
        .map(|(_, key)| key)
}

/// Keep the tail of the text that fits in `width` columns
pub fn fit_display(text: &str, width: u16) -> String {
    let mut used = 0usize;
    let mut tail: Vec<char> = Vec::new();
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width as usize {
            break;
        }
        used += w;
        tail.push(c);
    }
    tail.into_iter().rev().collect()
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = screen_layout(area, self.config.show_header);
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        if self.config.show_header && layout.header.height > 0 {
            let header = Paragraph::new(vec![
                Line::from(vec![
                    Span::styled("计算", bold_style),
                    Span::raw("  "),
                    Span::styled("汇率", Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled("━━", Style::default().fg(Color::Red))),
            ]);
            header.render(layout.header, buf);
        }

        if layout.display.height > 0 {
            let text = fit_display(self.calculator.surface().text(), layout.display.width);
            // bottom row of the display region, right aligned like a phone calculator
            let row = Rect {
                y: layout.display.y + layout.display.height - 1,
                height: 1,
                ..layout.display
            };
            Paragraph::new(Span::styled(text, bold_style))
                .alignment(Alignment::Right)
                .render(row, buf);
        }

        keypad::render_keypad(layout.keypad, buf);
    }
}
