use crate::app::{App, AppEvent};
use crate::config::SettingsStore;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{execute_effect, Services};
use super::loop_runner::LoopControl;

/// Routes a key press through the registry and the controller, then runs
/// whatever effect the transition asked for.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    services: &Services,
    settings: &mut SettingsStore,
    tx: &mpsc::Sender<AppEvent>,
) -> LoopControl {
    let context = app.context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return LoopControl::Continue;
    };
    tracing::trace!(?action, ?context, "Key dispatched");

    match app.apply(action) {
        Some(effect) => execute_effect(app, effect, services, settings, tx),
        None => LoopControl::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Article;
    use crate::app::Overlay;
    use crate::config::StartScreen;
    use crate::content::ContentClient;
    use crate::theme::ThemeName;
    use std::sync::Arc;

    fn fixture(name: &str) -> (App, Services, SettingsStore) {
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        app.loading = false;
        app.articles = vec![Article {
            id: "1".into(),
            title: "First".into(),
            url: "https://example.com/1".into(),
            summary: String::new(),
            tags: Vec::new(),
            reading_time_minutes: 3,
        }];
        let services = Services {
            api: None,
            reader: Arc::new(
                ContentClient::new(reqwest::Client::new(), "https://r.jina.ai", None).unwrap(),
            ),
        };
        let dir = std::env::temp_dir().join(format!("curak_input_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        (app, services, SettingsStore::open(dir.join("config.json")))
    }

    #[tokio::test]
    async fn test_q_quits_from_list() {
        let (mut app, services, mut store) = fixture("quit");
        let (tx, _rx) = mpsc::channel(4);
        let flow = handle_input(
            &mut app,
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            &services,
            &mut store,
            &tx,
        );
        assert!(matches!(flow, LoopControl::Quit));
    }

    #[tokio::test]
    async fn test_unbound_key_is_ignored() {
        let (mut app, services, mut store) = fixture("unbound");
        let (tx, _rx) = mpsc::channel(4);
        let flow = handle_input(
            &mut app,
            KeyCode::Char('z'),
            KeyModifiers::NONE,
            &services,
            &mut store,
            &tx,
        );
        assert!(matches!(flow, LoopControl::Continue));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[tokio::test]
    async fn test_theme_picker_roundtrip_persists() {
        let (mut app, services, mut store) = fixture("theme");
        let (tx, _rx) = mpsc::channel(4);
        for (code, modifiers) in [
            (KeyCode::Char('T'), KeyModifiers::SHIFT),
            (KeyCode::Char('j'), KeyModifiers::NONE),
            (KeyCode::Enter, KeyModifiers::NONE),
        ] {
            handle_input(&mut app, code, modifiers, &services, &mut store, &tx);
        }
        assert_eq!(app.theme.name, ThemeName::Ocean);
        assert_eq!(store.theme(), ThemeName::Ocean);
    }
}
