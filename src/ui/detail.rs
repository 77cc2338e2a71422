//! Detail overlay rendering.
//!
//! Displays a modal overlay for the selected station: latest values,
//! validation problems, today's extrema and the retained hourly rollups.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use weatherwatch_engine::{Aggregate, DailyRollup, Range, NOT_AVAILABLE};

use crate::app::App;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 60;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 18;

/// Render the station detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(station) = app.selected_station() else {
        return;
    };
    let hourly = app.selected_hourly();

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let problem_lines = station.problems.len().max(1) as u16;
    let chunks = Layout::vertical([
        Constraint::Length(8 + problem_lines), // Station info
        Constraint::Min(6),                    // Hourly table
        Constraint::Length(1),                 // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", station.station_id), bold),
            Span::styled(
                station.status.label(),
                app.theme.status_style(station.status).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Temperature: "),
            Span::styled(station.temperature.clone(), bold),
            Span::raw(format!("  (Ø {})", station.rolling_avg_temp)),
            Span::raw("    Humidity: "),
            Span::styled(station.humidity.clone(), bold),
            Span::raw(format!("  (Ø {})", station.rolling_avg_humidity)),
        ]),
        Line::from(format!(
            " Payload TS: {}    Last seen: {}    Buffered: {}",
            station.payload_timestamp, station.last_received_at, station.samples
        )),
        Line::from(daily_line(station.daily.as_ref())),
        Line::from(""),
    ];

    if station.problems.is_empty() {
        lines.push(Line::from(Span::styled(
            " No problems in latest reading",
            Style::default().fg(app.theme.ok),
        )));
    } else {
        for problem in &station.problems {
            lines.push(Line::from(Span::styled(
                format!(" • {}", problem),
                Style::default().fg(app.theme.invalid),
            )));
        }
    }

    let header_block = Block::default()
        .title(" Station Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(lines).block(header_block), chunks[0]);

    // ===== HOURLY ROLLUPS =====
    let hourly_block = Block::default()
        .title(format!(" Hourly ({}) ", hourly.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if hourly.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No messages received yet",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(hourly_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let header = Row::new(vec![
            Cell::from("Hour (local)"),
            Cell::from("Msgs"),
            Cell::from("Ø T"),
            Cell::from("T min/max"),
            Cell::from("Ø H"),
            Cell::from("H min/max"),
        ])
        .height(1)
        .style(app.theme.header);

        // Newest hour first
        let rows: Vec<Row> = hourly
            .iter()
            .rev()
            .map(|h| {
                Row::new(vec![
                    Cell::from(h.bucket.to_string()),
                    Cell::from(h.count.to_string()),
                    Cell::from(mean(&h.temperature)),
                    Cell::from(range(h.temperature.range.as_ref())),
                    Cell::from(mean(&h.humidity)),
                    Cell::from(range(h.humidity.range.as_ref())),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(17),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Fill(1),
        ];

        let table = Table::new(rows, widths).header(header).block(hourly_block);
        frame.render_widget(table, chunks[1]);
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑↓:station  Esc:close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn daily_line(daily: Option<&DailyRollup>) -> String {
    let Some(daily) = daily else {
        return format!(" Today: {}", NOT_AVAILABLE);
    };
    format!(
        " Today ({}): T {}    H {}",
        daily.date,
        range(daily.temperature.as_ref()),
        range(daily.humidity.as_ref())
    )
}

fn mean(aggregate: &Aggregate) -> String {
    aggregate
        .mean()
        .map(|m| format!("{:.1}", m))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn range(range: Option<&Range>) -> String {
    range
        .map(|r| format!("{:.1} / {:.1}", r.min(), r.max()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
