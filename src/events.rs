use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Step through stations while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Stations),
        KeyCode::Char('2') => app.set_view(View::Problems),

        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => {
            app.reload_data();
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Keep text but exit input mode
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows below the table header
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                app.select_row(item_row);
            }

            // Tab bar sits on row 1: " 1:Stations " then " 2:Problems (n) "
            if clicked_row == 1 {
                if mouse.column < 13 {
                    app.set_view(View::Stations);
                } else if mouse.column < 30 {
                    app.set_view(View::Problems);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FeedState, LiveSource};
    use crate::ui::Theme;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use weatherwatch_engine::{Ingestor, StationStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let ingestor = Ingestor::new(StationStore::default());
        for id in ["alpha", "beta", "gamma"] {
            let payload = format!(r#"{{"stationId":"{}","temperature":20,"humidity":50}}"#, id);
            ingestor.ingest(payload.as_bytes());
        }
        let source = LiveSource::new(ingestor, "test", FeedState::default());
        let mut app = App::new(Box::new(source), Duration::from_secs(300));
        app.theme = Theme::dark();
        app.reload_data();
        app
    }

    #[test]
    fn quit_and_view_switching() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Problems);
        handle_key_event(&mut app, key(KeyCode::Char('1')));
        assert_eq!(app.current_view, View::Stations);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn filter_mode_captures_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);

        // 'q' is text while filtering
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.filter_text, "q");

        handle_key_event(&mut app, key(KeyCode::Backspace));
        assert!(!app.filter_active);
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn overlay_navigation() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);

        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected_station().unwrap().station_id, "beta");

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn export_key_reports_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.export_path = dir.path().join("out.json");

        handle_key_event(&mut app, key(KeyCode::Char('e')));
        assert!(app.export_path.exists());
        assert!(app.get_status_message().unwrap().starts_with("Exported to"));
    }
}
