use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::navigation::{NavLink, Page};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // Viewer containers are refit on the next render
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.on_tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let handled = match app.current_page() {
        Some(Page::Landing) => handle_landing_normal(app, key),
        Some(Page::Dashboard) => handle_dashboard_normal(app, key),
        Some(Page::Coach) => handle_coach_normal(app, key),
        Some(Page::Login) => handle_login_normal(app, key),
        None => false,
    };
    if handled {
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char(c) => {
            if let Some(link) = NavLink::header()
                .into_iter()
                .find(|l| l.shortcut().eq_ignore_ascii_case(&c))
            {
                app.follow_link(link);
            }
        }
        _ => {}
    }
}

fn handle_landing_normal(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter | KeyCode::Char('g') => {
            app.follow_link(NavLink::GetStarted);
            true
        }
        _ => false,
    }
}

fn handle_dashboard_normal(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            true
        }
        KeyCode::Enter | KeyCode::Char('g') => {
            app.request_workout();
            true
        }
        _ => false,
    }
}

fn handle_coach_normal(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
            true
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat_scroll = app.chat_scroll.saturating_add(1);
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat_scroll = app.chat_scroll.saturating_sub(1);
            true
        }
        _ => false,
    }
}

fn handle_login_normal(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            true
        }
        KeyCode::Left => {
            app.auth.select_login_tab();
            true
        }
        KeyCode::Right => {
            app.auth.select_signup_tab();
            true
        }
        KeyCode::Tab => {
            app.auth.focus_next();
            true
        }
        KeyCode::BackTab => {
            app.auth.focus_prev();
            true
        }
        _ => false,
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    match app.current_page() {
        Some(Page::Login) => handle_login_editing(app, key),
        Some(Page::Dashboard) => handle_dashboard_editing(app, key),
        Some(Page::Coach) => handle_coach_editing(app, key),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_login_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.submit_auth();
        }
        KeyCode::Tab => app.auth.focus_next(),
        KeyCode::BackTab => app.auth.focus_prev(),
        KeyCode::Backspace => app.auth.backspace(),
        KeyCode::Char(c) => app.auth.insert_char(c),
        _ => {}
    }
}

fn handle_dashboard_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.request_workout();
        }
        KeyCode::Backspace => {
            app.workout_focus.pop();
        }
        KeyCode::Char(c) => app.workout_focus.push(c),
        _ => {}
    }
}

fn handle_coach_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.send_chat(),
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => app.chat_cursor = 0,
        KeyCode::End => app.chat_cursor = app.chat_input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked = app
                .nav_areas
                .iter()
                .find(|(_, area)| point_in_rect(x, y, *area))
                .map(|(link, _)| *link)
                .or_else(|| {
                    app.get_started_area
                        .filter(|area| {
                            app.navigator.is_visible(Page::Landing) && point_in_rect(x, y, *area)
                        })
                        .map(|_| NavLink::GetStarted)
                });
            if let Some(link) = clicked {
                app.follow_link(link);
            }
        }
        MouseEventKind::ScrollDown if app.current_page() == Some(Page::Coach) => {
            app.chat_scroll = app.chat_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp if app.current_page() == Some(Page::Coach) => {
            app.chat_scroll = app.chat_scroll.saturating_sub(3);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use async_trait::async_trait;
    use crossterm::event::KeyEventKind;
    use crate::auth::AuthMode;
    use crate::config::Config;
    use crate::workout::{GenerationError, PlanGenerator};

    struct NoopGenerator;

    #[async_trait]
    impl PlanGenerator for NoopGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::MissingCredential)
        }
    }

    fn app() -> App {
        App::new(&Config::new(), Arc::new(NoopGenerator))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_nav_shortcuts() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.current_page(), Some(Page::Dashboard));
        press(&mut app, KeyCode::Char('C'));
        assert_eq!(app.current_page(), Some(Page::Coach));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.current_page(), Some(Page::Login));
        assert_eq!(app.auth.mode, AuthMode::Signup);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.current_page(), Some(Page::Landing));
    }

    #[test]
    fn test_landing_enter_is_get_started() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_page(), Some(Page::Login));
        assert_eq!(app.auth.mode, AuthMode::Signup);
    }

    #[test]
    fn test_keyboard_login_flow() {
        let mut app = app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);

        // Typing 'd' here must not navigate away
        type_str(&mut app, "dan@b.com");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "pw");
        assert_eq!(app.current_page(), Some(Page::Login));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_page(), Some(Page::Dashboard));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.displayed_metrics.is_some());
    }

    #[test]
    fn test_login_error_keeps_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_page(), Some(Page::Login));
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.auth.error.is_some());
    }

    #[test]
    fn test_login_tabs_with_arrows() {
        let mut app = app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.auth.mode, AuthMode::Signup);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.auth.mode, AuthMode::Login);
    }

    #[test]
    fn test_chat_cursor_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, "hé");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.chat_input, "hxé");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.chat_input, "hé");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_ctrl_c_quits_from_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('i'));
        let key = KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        handle_event(&mut app, AppEvent::Key(key));
        assert!(app.should_quit);
    }

    #[test]
    fn test_click_nav_tab() {
        let mut app = app();
        app.nav_areas = vec![(NavLink::Coach, Rect::new(10, 0, 8, 1))];
        app.get_started_area = Some(Rect::new(5, 10, 15, 3));

        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        handle_event(&mut app, AppEvent::Mouse(click(6, 11)));
        assert_eq!(app.current_page(), Some(Page::Login));
        assert_eq!(app.auth.mode, AuthMode::Signup);

        handle_event(&mut app, AppEvent::Mouse(click(12, 0)));
        assert_eq!(app.current_page(), Some(Page::Coach));

        // The call-to-action only exists on the landing page
        handle_event(&mut app, AppEvent::Mouse(click(6, 11)));
        assert_eq!(app.current_page(), Some(Page::Coach));
    }

    #[tokio::test]
    async fn test_dashboard_generate_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, "legs");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.workout_focus, "legs");
        assert!(app.planner.is_generating());
    }
}
