use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use decalc::keypad::{Key, KEYPAD_COLUMNS, KEYPAD_ROWS, KEYPAD_ROW_COUNT};

/// Button areas in keypad order, left to right and top to bottom
pub fn button_rects(area: Rect) -> Vec<(Rect, Key)> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, KEYPAD_ROW_COUNT as u32); KEYPAD_ROW_COUNT])
        .split(area);

    rows.iter()
        .zip(KEYPAD_ROWS.iter())
        .flat_map(|(row_area, keys)| {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, KEYPAD_COLUMNS as u32); KEYPAD_COLUMNS])
                .split(*row_area);
            cols.iter()
                .copied()
                .zip(keys.iter().copied())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn button_style(key: Key) -> Style {
    match key {
        Key::Equals => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        Key::Add | Key::Subtract | Key::Multiply | Key::Divide => Style::default().fg(Color::Red),
        Key::Clear | Key::Backspace | Key::Negate => Style::default().fg(Color::LightRed),
        Key::MemoryClear | Key::MemoryAdd | Key::MemorySubtract | Key::MemoryRecall => {
            Style::default().fg(Color::DarkGray)
        }
        _ => Style::default(),
    }
}

pub fn render_keypad(area: Rect, buf: &mut Buffer) {
    for (rect, key) in button_rects(area) {
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        let style = button_style(key);
        // decorative rows are drawn without a frame, like the memory row on a phone
        let block = if key.is_inert() && key != Key::Negate {
            Block::default()
        } else {
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray))
        };
        let inner = block.inner(rect);
        block.render(rect, buf);

        if inner.height == 0 {
            continue;
        }
        let label_row = Rect {
            y: inner.y + inner.height / 2,
            height: 1,
            ..inner
        };
        Paragraph::new(key.label())
            .style(style)
            .alignment(Alignment::Center)
            .render(label_row, buf);
    }
}
