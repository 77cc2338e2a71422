//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use weatherwatch_engine::{HourlyRollup, IngestStats, Snapshot, StationStatus, StationView};

use crate::source::DataSource;
use crate::ui::stations::{sort_stations_by, SortColumn};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Station detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every station with its latest values and status.
    Stations,
    /// Stations that are invalid or stale, with their problems.
    Problems,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Stations => View::Problems,
            View::Problems => View::Stations,
        }
    }

    pub fn prev(self) -> Self {
        // Two views: previous and next coincide.
        self.next()
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Stations => "Stations",
            View::Problems => "Problems",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub snapshot: Option<Snapshot>,
    pub stats: IngestStats,
    pub load_error: Option<String>,
    pub last_refresh: Option<Instant>,
    /// Rolling window, for column titles.
    pub rolling_window: Duration,

    // Navigation state (visual indices into the filtered, sorted lists)
    pub selected_station_index: usize,
    pub selected_problem_index: usize,

    // Sorting (Stations view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(source: Box<dyn DataSource>, rolling_window: Duration) -> Self {
        Self {
            running: true,
            current_view: View::Stations,
            show_help: false,
            show_detail_overlay: false,
            source,
            snapshot: None,
            stats: IngestStats::default(),
            load_error: None,
            last_refresh: None,
            rolling_window,
            selected_station_index: 0,
            selected_problem_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            export_path: PathBuf::from("weather_export.json"),
            status_message: None,
        }
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < Duration::from_secs(3) => Some(msg),
            _ => None,
        }
    }

    /// Take a fresh snapshot from the source.
    ///
    /// Returns `true` if a snapshot was received.
    pub fn reload_data(&mut self) -> bool {
        self.load_error = self.source.error();
        self.stats = self.source.stats();

        let Some(snapshot) = self.source.poll() else {
            return false;
        };
        self.snapshot = Some(snapshot);
        self.last_refresh = Some(Instant::now());
        self.clamp_selection();
        true
    }

    fn clamp_selection(&mut self) {
        let stations = self.visible_stations().len();
        let problems = self.visible_problems().len();
        self.selected_station_index = self
            .selected_station_index
            .min(stations.saturating_sub(1));
        self.selected_problem_index = self
            .selected_problem_index
            .min(problems.saturating_sub(1));
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Stations shown in the Stations view, filtered and sorted.
    pub fn visible_stations(&self) -> Vec<&StationView> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        let mut stations: Vec<&StationView> = snapshot
            .iter()
            .filter(|s| self.matches_filter(&s.station_id))
            .collect();
        sort_stations_by(&mut stations, self.sort_column, self.sort_ascending);
        stations
    }

    /// Stations shown in the Problems view: invalid or stale, worst first.
    pub fn visible_problems(&self) -> Vec<&StationView> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        let mut stations: Vec<&StationView> = snapshot
            .iter()
            .filter(|s| matches!(s.status, StationStatus::Invalid | StationStatus::Stale))
            .filter(|s| self.matches_filter(&s.station_id))
            .collect();
        stations.sort_by(|a, b| {
            b.status
                .cmp(&a.status)
                .then_with(|| a.station_id.cmp(&b.station_id))
        });
        stations
    }

    fn visible_len(&self) -> usize {
        match self.current_view {
            View::Stations => self.visible_stations().len(),
            View::Problems => self.visible_problems().len(),
        }
    }

    fn selected_index_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Stations => &mut self.selected_station_index,
            View::Problems => &mut self.selected_problem_index,
        }
    }

    /// The station under the cursor in the current view.
    pub fn selected_station(&self) -> Option<&StationView> {
        match self.current_view {
            View::Stations => self
                .visible_stations()
                .get(self.selected_station_index)
                .copied(),
            View::Problems => self
                .visible_problems()
                .get(self.selected_problem_index)
                .copied(),
        }
    }

    /// Hourly rollups for the selected station.
    pub fn selected_hourly(&self) -> Vec<HourlyRollup> {
        self.selected_station()
            .map(|s| self.source.hourly(&s.station_id))
            .unwrap_or_default()
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_len().saturating_sub(1);
        let index = self.selected_index_mut();
        *index = (*index + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        let index = self.selected_index_mut();
        *index = index.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        *self.selected_index_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let last = self.visible_len().saturating_sub(1);
        *self.selected_index_mut() = last;
    }

    /// Select a visual row directly (mouse clicks).
    pub fn select_row(&mut self, row: usize) {
        if row < self.visible_len() {
            *self.selected_index_mut() = row;
        }
    }

    /// Open the detail overlay for the selected station.
    pub fn enter_detail(&mut self) {
        if self.selected_station().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the Stations view.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        self.current_view = View::Stations;
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Stations {
            self.sort_column = self.sort_column.next();
        }
    }

    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Stations {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.clamp_selection();
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    /// Case-insensitive substring match on the station identifier.
    pub fn matches_filter(&self, station_id: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        station_id
            .to_lowercase()
            .contains(&self.filter_text.to_lowercase())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current snapshot to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(snapshot) = &self.snapshot else {
            anyhow::bail!("No data to export");
        };
        write_export(path, snapshot, self.stats, self.source_description())
    }
}

/// Build the export document for a snapshot.
pub fn export_document(
    snapshot: &Snapshot,
    stats: IngestStats,
    source: &str,
) -> serde_json::Value {
    let mut summary = serde_json::Map::new();
    summary.insert("stations".to_string(), json!(snapshot.len()));
    for status in StationStatus::ALL {
        summary.insert(
            status.label().to_lowercase(),
            json!(snapshot.count(status)),
        );
    }
    summary.insert("accepted".to_string(), json!(stats.accepted));
    summary.insert("dropped".to_string(), json!(stats.dropped));

    json!({
        "source": source,
        "takenAt": snapshot.taken_at,
        "summary": summary,
        "stations": snapshot.stations,
    })
}

/// Write the export document as pretty JSON.
pub fn write_export(
    path: &Path,
    snapshot: &Snapshot,
    stats: IngestStats,
    source: &str,
) -> Result<()> {
    let document = export_document(snapshot, stats, source);
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), stations = snapshot.len(), "exported snapshot");
    Ok(())
}
