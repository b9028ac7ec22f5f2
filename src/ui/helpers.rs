use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::editor::{BookRow, NoticeKind};

/// Footer colour for a notice.
pub(crate) fn notice_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Info => Style::default().fg(Color::Green),
        NoticeKind::Error => Style::default().fg(Color::Red),
    }
}

/// Checkbox line for one book. Locked rows (the default set) are dimmed.
pub(crate) fn book_row_line(row: &BookRow<'_>, locked: bool) -> Line<'static> {
    let mark = if row.included { "[x]" } else { "[ ]" };
    let style = if locked {
        Style::default().fg(Color::DarkGray)
    } else if row.included {
        Style::default()
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(format!("{mark} "), style.add_modifier(Modifier::BOLD)),
        Span::styled(row.book.name.clone(), style),
    ])
}

/// Tab strip of set names with the current one highlighted.
pub(crate) fn set_tabs_line(names: &[&str], current: &str) -> Line<'static> {
    let mut spans = Vec::with_capacity(names.len() * 2);
    for (index, name) in names.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" | "));
        }
        let style = if *name == current {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {name} "), style));
    }
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}
