// Keyboard event handling
//
// This module contains the keyboard event handler that processes
// user input and updates the application state accordingly.

use super::{AppState, InputMode};
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Arguments
/// * `app` - Mutable reference to the application state
/// * `key` - The key code that was pressed
///
/// # Key Bindings
/// - `q`, `Q` - Quit the application
/// - `Esc` - Close the chain detail, or quit when none is open
/// - `Up` / `Down` - Move the chain list cursor
/// - `Enter` - Open detail for the chain under the cursor
/// - `b`, `B` - Particle burst
/// - `a`, `A` - Toggle animations
/// - `t`, `T` - Toggle chain labels
/// - `s`, `S` - Cycle list sort (TPS / name)
/// - `/` - Start typing a filter
/// - `r`, `R` - Retry / refresh now
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    if app.input_mode == InputMode::Filter {
        handle_filter_key(app, key);
        return true;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.running = false;
            false
        }
        KeyCode::Esc => {
            if app.close_detail() {
                true
            } else {
                app.running = false;
                false
            }
        }
        KeyCode::Up => {
            app.select_previous_chain();
            true
        }
        KeyCode::Down => {
            app.select_next_chain();
            true
        }
        KeyCode::Enter => {
            app.open_selected_chain();
            true
        }
        KeyCode::Char('b') | KeyCode::Char('B') => {
            app.trigger_burst();
            true
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.toggle_animations();
            true
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.toggle_labels();
            true
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.cycle_sort();
            true
        }
        KeyCode::Char('/') => {
            app.begin_filter();
            true
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.retry();
            true
        }
        _ => true,
    }
}

/// Keys while the filter prompt is open
fn handle_filter_key(app: &mut AppState, key: KeyCode) {
    match key {
        KeyCode::Enter => app.end_filter(),
        KeyCode::Esc => app.cancel_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char(c) => app.push_filter_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::poller::testing::{snapshot, ScriptedSource};
    use crate::random::SeededRandom;
    use crate::scheduler::{ManualClock, TimerScheduler};
    use std::sync::Arc;
    use std::time::Duration;

    fn new_app() -> AppState {
        let source = ScriptedSource::new(vec![Ok(snapshot(&[
            ("c-chain", 12.0),
            ("dfk", 3.0),
            ("beam", 7.0),
        ]))]);
        let mut app = AppState::new(
            AppConfig::default(),
            Arc::new(source),
            Box::new(TimerScheduler::new(ManualClock::new())),
            Box::new(SeededRandom::seeded(1)),
        );
        app.set_viewport(200.0, 200.0);
        app.mount();
        assert!(app.wait_for_poll(Duration::from_secs(2)));
        app
    }

    #[test]
    fn test_quit_keys() {
        let mut app = new_app();

        // Test 'q' key
        assert!(app.running);
        let result = handle_key_event(&mut app, KeyCode::Char('q'));
        assert!(!result);
        assert!(!app.running);

        // Reset and test 'Q' key
        app.running = true;
        let result = handle_key_event(&mut app, KeyCode::Char('Q'));
        assert!(!result);
        assert!(!app.running);

        // Reset and test Esc key
        app.running = true;
        let result = handle_key_event(&mut app, KeyCode::Esc);
        assert!(!result);
        assert!(!app.running);
    }

    #[test]
    fn test_esc_closes_detail_first() {
        let mut app = new_app();
        handle_key_event(&mut app, KeyCode::Down);
        handle_key_event(&mut app, KeyCode::Enter);
        assert_eq!(app.selection.selected.as_deref(), Some("c-chain"));

        assert!(handle_key_event(&mut app, KeyCode::Esc));
        assert!(app.selection.selected.is_none());
        assert!(app.running);
    }

    #[test]
    fn test_toggle_animations() {
        let mut app = new_app();

        // Default: animations enabled
        assert!(app.settings.animations_enabled);

        // Toggle off
        handle_key_event(&mut app, KeyCode::Char('a'));
        assert!(!app.settings.animations_enabled);
        assert!(!app.animation().is_running());

        // Toggle on
        handle_key_event(&mut app, KeyCode::Char('A'));
        assert!(app.settings.animations_enabled);
        assert!(app.animation().is_running());
    }

    #[test]
    fn test_toggle_labels() {
        let mut app = new_app();

        // Default: labels enabled
        assert!(app.settings.labels_enabled);

        // Toggle off
        handle_key_event(&mut app, KeyCode::Char('t'));
        assert!(!app.settings.labels_enabled);

        // Toggle on
        handle_key_event(&mut app, KeyCode::Char('T'));
        assert!(app.settings.labels_enabled);
    }

    #[test]
    fn test_burst_key() {
        let mut app = new_app();
        handle_key_event(&mut app, KeyCode::Char('b'));
        // Two satellites, one particle each way
        assert_eq!(app.animation().system().len(), 4);
    }

    #[test]
    fn test_filter_prompt_captures_keys() {
        let mut app = new_app();
        handle_key_event(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Filter);

        // 'q' is text here, not quit
        assert!(handle_key_event(&mut app, KeyCode::Char('b')));
        assert!(handle_key_event(&mut app, KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.filter, "bq");

        handle_key_event(&mut app, KeyCode::Backspace);
        handle_key_event(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.filter, "b");
        assert_eq!(app.visible_chains().len(), 1);

        handle_key_event(&mut app, KeyCode::Char('/'));
        handle_key_event(&mut app, KeyCode::Esc);
        assert!(app.filter.is_empty());
        assert!(app.running);
    }

    #[test]
    fn test_sort_key() {
        let mut app = new_app();
        handle_key_event(&mut app, KeyCode::Char('s'));
        let first = app.visible_chains()[0].chain_id.clone();
        assert_eq!(first, "beam");
    }
}
