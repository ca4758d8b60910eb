use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cli::handlers::Context;
use crate::ops::host::Host;
use crate::ops::store::ProjectStore;

use super::app::App;

/// Handle a key event
pub fn handle_key(app: &mut App, ctx: &mut Context, key: KeyEvent) {
    handle_menu_key(app, &mut ctx.store, &ctx.host, key);
}

fn handle_menu_key(app: &mut App, store: &mut ProjectStore, host: &dyn Host, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;

    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => app.should_quit = true,
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => app.should_quit = true,
        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => app.move_down(),
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => app.move_up(),
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => app.move_to_first(),
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => app.move_to_last(),
        (_, KeyCode::Enter) => app.launch_selected(store, host),
        (_, KeyCode::Char('e')) => app.cycle_editor(store, true),
        (_, KeyCode::Char('E')) => app.cycle_editor(store, false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppConfig, Editor};
    use crate::ops::launcher::tests::FakeHost;
    use crate::tui::app::tests::fixture;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        for key in [
            press(KeyCode::Char('q')),
            press(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut fx = fixture();
            let mut app = App::new(&mut fx.store, &AppConfig::default());
            handle_menu_key(&mut app, &mut fx.store, &FakeHost::default(), key);
            assert!(app.should_quit);
        }
    }

    #[test]
    fn navigation_and_launch() {
        let mut fx = fixture();
        let mut app = App::new(&mut fx.store, &AppConfig::default());
        let host = FakeHost::default();
        handle_menu_key(&mut app, &mut fx.store, &host, press(KeyCode::Char('j')));
        handle_menu_key(&mut app, &mut fx.store, &host, press(KeyCode::Enter));
        let calls = host.calls();
        assert!(calls.last().unwrap().starts_with("browse "));
        assert!(calls.last().unwrap().ends_with("api"));
    }

    #[test]
    fn editor_keys_persist_through_store() {
        let mut fx = fixture();
        let mut app = App::new(&mut fx.store, &AppConfig::default());
        let host = FakeHost::default();
        handle_menu_key(&mut app, &mut fx.store, &host, press(KeyCode::Char('e')));
        assert_eq!(fx.store.preference().selected, Editor::Cursor);
        assert_eq!(app.message.as_deref(), Some("Editor: Cursor"));

        // Any other key clears the message
        handle_menu_key(&mut app, &mut fx.store, &host, press(KeyCode::Char('x')));
        assert_eq!(app.message, None);
    }
}
