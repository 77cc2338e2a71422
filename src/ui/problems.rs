//! Problems view rendering.
//!
//! Lists stations that are invalid or stale, worst first, with the
//! validation problems of their latest reading.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use weatherwatch_engine::{StationStatus, StationView};

use crate::app::App;

/// Render the Problems view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.snapshot.is_none() {
        return;
    }
    let stations = app.visible_problems();

    let block = Block::default()
        .title(format!(" Problems ({}) ", stations.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if stations.is_empty() {
        let message = if app.filter_text.is_empty() {
            "  All stations reporting valid data"
        } else {
            "  No matching stations with problems"
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                message,
                Style::default().fg(app.theme.ok),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Station"),
        Cell::from("Status"),
        Cell::from("Last Seen (UTC)"),
        Cell::from("Problem"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = stations
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.station_id.clone()),
                Cell::from(s.status.label()).style(app.theme.status_style(s.status)),
                Cell::from(s.last_received_at.clone()),
                Cell::from(describe(s)).style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(8),
        Constraint::Fill(3),
        Constraint::Fill(5),
    ];

    let selected = app
        .selected_problem_index
        .min(stations.len().saturating_sub(1));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

/// One-line summary of what is wrong with a station.
fn describe(station: &StationView) -> String {
    match station.status {
        StationStatus::Stale if station.problems.is_empty() => "no recent messages".to_string(),
        StationStatus::Stale => format!("no recent messages; {}", station.problems.join("; ")),
        _ => station.problems.join("; "),
    }
}
