use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::db::StoreError;
use crate::models::StudentRecord;

/// Labelled field rows for the detail pane.
pub(crate) fn record_detail_lines(record: &StudentRecord) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::Green);
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::raw(value),
        ])
    };

    vec![
        Line::from(vec![
            Span::styled(
                "ID: ",
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(record.id.to_string()),
        ]),
        row("Name", record.name.clone()),
        row("Reg No", record.registration_number.clone()),
        row("Age", record.age.to_string()),
        row("Major", record.major.clone()),
    ]
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

/// Extract the most relevant error message from a chained error. Store errors
/// already carry their cause in the message, so they are shown whole.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(store_err) = err.downcast_ref::<StoreError>() {
        return store_err.to_string();
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
