//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use weatherwatch_engine::StationStatus;

use crate::app::{App, View};
use crate::duration::format_age;

/// Render the header bar with a station status overview.
///
/// Displays: overall indicator, station counts by status, ingest counters.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        let line = Line::from(vec![
            Span::styled(
                " WEATHERWATCH ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    // Worst status present drives the indicator
    let worst = snapshot
        .iter()
        .map(|s| s.status)
        .filter(|s| *s != StationStatus::Offline)
        .max()
        .unwrap_or(StationStatus::Ok);

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(worst)),
        Span::styled("WEATHERWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];

    for status in StationStatus::ALL {
        let count = snapshot.count(status);
        let style = if count > 0 {
            app.theme.status_style(status)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(count.to_string(), style));
        spans.push(Span::raw(format!(" {} ", status.label().to_lowercase())));
    }

    spans.push(Span::raw("│ "));
    spans.push(Span::styled(
        snapshot.len().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" stations │ "));
    spans.push(Span::raw(format!(
        "msgs:{} dropped:{}",
        format_count(app.stats.accepted),
        format_count(app.stats.dropped)
    )));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let problems = app.visible_problems().len();
    let titles: Vec<Line> = vec![
        Line::from(" 1:Stations "),
        Line::from(format!(" 2:Problems ({}) ", problems)),
    ];

    let selected = match app.current_view {
        View::Stations => 0,
        View::Problems => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, time since last refresh and available controls, or a
/// temporary status message or feed error when there is one.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(
            " {} | Error: {} | q:quit",
            app.source_description(),
            err
        ))
        .style(Style::default().fg(app.theme.invalid));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(refreshed) = app.last_refresh {
        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            match app.current_view {
                View::Stations => {
                    "/:search s:sort S:reverse Tab:switch Enter:detail e:export ?:help q:quit"
                }
                View::Problems => "/:search Tab:switch Enter:detail e:export ?:help q:quit",
            }
        };

        format!(
            " {} > {} | Updated {} ago | {}",
            app.source_description(),
            app.current_view.label(),
            format_age(refreshed.elapsed()),
            controls,
        )
    } else {
        " Waiting for data... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2         Stations/Problems"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 stations"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Station detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Stations"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_abbreviated() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(2_500_000), "2.5M");
    }
}
