//! Stations view rendering.
//!
//! One row per station: latest readings, rolling averages, timestamps and
//! status, in a sortable and filterable table.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use weatherwatch_engine::StationView;

use crate::app::App;
use crate::duration::format_window;

/// Column to sort by in the Stations view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Station,
    Temperature,
    Humidity,
    /// Most recent receive time.
    LastSeen,
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Station => SortColumn::Temperature,
            SortColumn::Temperature => SortColumn::Humidity,
            SortColumn::Humidity => SortColumn::LastSeen,
            SortColumn::LastSeen => SortColumn::Status,
            SortColumn::Status => SortColumn::Station,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Station => "station",
            SortColumn::Temperature => "temp",
            SortColumn::Humidity => "humidity",
            SortColumn::LastSeen => "last seen",
            SortColumn::Status => "status",
        }
    }
}

/// Render the Stations view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        return;
    };
    let stations = app.visible_stations();
    let window = format_window(app.rolling_window);

    let header = Row::new(vec![
        Cell::from(format_header("Station", SortColumn::Station, app)),
        Cell::from(format_header("Temp", SortColumn::Temperature, app)),
        Cell::from(format_header("Humidity", SortColumn::Humidity, app)),
        Cell::from(format!("Ø{} T", window)),
        Cell::from(format!("Ø{} H", window)),
        Cell::from("Payload TS (UTC)"),
        Cell::from(format_header("Last Seen (UTC)", SortColumn::LastSeen, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = stations
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.station_id.clone()),
                Cell::from(s.temperature.clone()),
                Cell::from(s.humidity.clone()),
                Cell::from(s.rolling_avg_temp.clone()),
                Cell::from(s.rolling_avg_humidity.clone()),
                Cell::from(s.payload_timestamp.clone()),
                Cell::from(s.last_received_at.clone()),
                Cell::from(s.status.label()).style(app.theme.status_style(s.status)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),    // Station
        Constraint::Length(10), // Temp
        Constraint::Length(10), // Humidity
        Constraint::Length(9),  // Ø T
        Constraint::Length(9),  // Ø H
        Constraint::Fill(3),    // Payload TS
        Constraint::Fill(3),    // Last Seen
        Constraint::Length(8),  // Status
    ];

    let selected = app
        .selected_station_index
        .min(stations.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !stations.is_empty() {
        format!(" [{}/{}]", selected + 1, stations.len())
    } else {
        String::new()
    };

    let title = format!(
        " Stations ({}/{}) [s:sort {}{}]{}{} ",
        stations.len(),
        snapshot.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort stations by the given column and direction.
///
/// Values that do not parse as numbers sort after every number.
pub fn sort_stations_by(stations: &mut [&StationView], column: SortColumn, ascending: bool) {
    stations.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Station => a.station_id.cmp(&b.station_id),
            SortColumn::Temperature => {
                compare_numbers(leading_number(&a.temperature), leading_number(&b.temperature))
            }
            SortColumn::Humidity => {
                compare_numbers(leading_number(&a.humidity), leading_number(&b.humidity))
            }
            SortColumn::LastSeen => a.last_received_at.cmp(&b.last_received_at),
            SortColumn::Status => a.status.cmp(&b.status),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by identifier keeps equal rows stable
        if primary == Ordering::Equal {
            a.station_id.cmp(&b.station_id)
        } else {
            primary
        }
    });
}

/// Numeric part of a rendered value such as `"20.5 °C"`.
fn leading_number(text: &str) -> Option<f64> {
    text.split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherwatch_engine::StationStatus;

    fn view(id: &str, temperature: &str, status: StationStatus) -> StationView {
        StationView {
            station_id: id.to_string(),
            temperature: temperature.to_string(),
            humidity: "n/a".to_string(),
            rolling_avg_temp: "n/a".to_string(),
            rolling_avg_humidity: "n/a".to_string(),
            payload_timestamp: "n/a".to_string(),
            last_received_at: "n/a".to_string(),
            status,
            valid: true,
            problems: Vec::new(),
            daily: None,
            samples: 0,
        }
    }

    fn ids(stations: &[&StationView]) -> Vec<String> {
        stations.iter().map(|s| s.station_id.clone()).collect()
    }

    #[test]
    fn sort_column_cycles() {
        let mut col = SortColumn::default();
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Station);
    }

    #[test]
    fn temperature_sort_is_numeric() {
        let a = view("a", "9.0 °C", StationStatus::Ok);
        let b = view("b", "-12.5 °C", StationStatus::Ok);
        let c = view("c", "n/a", StationStatus::Offline);
        let d = view("d", "10.0 °C", StationStatus::Ok);
        let mut stations = vec![&a, &b, &c, &d];

        sort_stations_by(&mut stations, SortColumn::Temperature, true);
        assert_eq!(ids(&stations), ["b", "a", "d", "c"]);

        sort_stations_by(&mut stations, SortColumn::Temperature, false);
        assert_eq!(ids(&stations), ["c", "d", "a", "b"]);
    }

    #[test]
    fn status_sort_breaks_ties_by_id() {
        let a = view("a", "1.0 °C", StationStatus::Stale);
        let b = view("b", "1.0 °C", StationStatus::Ok);
        let c = view("c", "1.0 °C", StationStatus::Ok);
        let mut stations = vec![&a, &c, &b];

        sort_stations_by(&mut stations, SortColumn::Status, true);
        assert_eq!(ids(&stations), ["b", "c", "a"]);
    }

    #[test]
    fn leading_number_parses_rendered_values() {
        assert_eq!(leading_number("20.5 °C"), Some(20.5));
        assert_eq!(leading_number("55.0 %"), Some(55.0));
        assert_eq!(leading_number("warm"), None);
        assert_eq!(leading_number("n/a"), None);
    }
}
