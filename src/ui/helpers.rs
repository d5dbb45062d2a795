//! Effect execution: turns controller effects into background tasks and
//! one-shot side effects.

use crate::api::{ApiClient, PAGE_SIZE};
use crate::app::{App, AppEvent, Effect, TaskKind};
use crate::config::SettingsStore;
use crate::content::ContentClient;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::loop_runner::LoopControl;

/// Shown instead of the list when no token is configured.
pub const NO_TOKEN_MESSAGE: &str =
    "No API token configured. Run `curak --set-token <TOKEN>` or set CURAQ_MCP_TOKEN.";

/// External collaborators the background tasks talk to.
#[derive(Clone)]
pub struct Services {
    /// `None` when no token is configured
    pub api: Option<Arc<ApiClient>>,
    pub reader: Arc<ContentClient>,
}

/// Wraps a future so that a panic inside it comes back as an `Err` holding
/// the panic message instead of silently killing the task.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, "Failed to deliver task result (receiver dropped)");
    }
}

/// Carries out one effect. Only [`Effect::Quit`] stops the loop.
pub(super) fn execute_effect(
    app: &mut App,
    effect: Effect,
    services: &Services,
    settings: &mut SettingsStore,
    tx: &mpsc::Sender<AppEvent>,
) -> LoopControl {
    match effect {
        Effect::Quit => return LoopControl::Quit,
        Effect::LoadArticles { generation } => spawn_article_load(services, generation, tx),
        Effect::LoadReader { url, generation } => spawn_reader_load(services, url, generation, tx),
        Effect::MarkRead { id } => spawn_mark_read(services, id, tx),
        Effect::OpenUrl(url) => open_in_browser(app, &url),
        Effect::PersistTheme(name) => {
            if let Err(e) = settings.set_theme(name) {
                tracing::warn!(theme = %name, error = %e, "Failed to persist theme");
                app.set_status(format!("Theme applied but not saved: {e}"));
            }
        }
    }
    LoopControl::Continue
}

fn spawn_article_load(services: &Services, generation: u64, tx: &mpsc::Sender<AppEvent>) {
    let api = services.api.clone();
    let tx = tx.clone();
    tracing::debug!(generation, "Spawning article load");

    tokio::spawn(async move {
        let work = async move {
            match api {
                Some(api) => api
                    .list_articles(1, PAGE_SIZE)
                    .await
                    .map_err(|e| e.to_string()),
                None => Err(NO_TOKEN_MESSAGE.to_string()),
            }
        };
        let event = match catch_task_panic(work).await {
            Ok(result) => AppEvent::ArticlesLoaded { generation, result },
            Err(error) => AppEvent::TaskPanicked {
                task: TaskKind::Articles { generation },
                error,
            },
        };
        send_event(&tx, event).await;
    });
}

fn spawn_reader_load(services: &Services, url: String, generation: u64, tx: &mpsc::Sender<AppEvent>) {
    let reader = Arc::clone(&services.reader);
    let tx = tx.clone();
    tracing::debug!(url = %url, generation, "Spawning reader load");

    tokio::spawn(async move {
        let result = catch_task_panic(reader.extract(&url)).await;
        let event = match result {
            Ok(result) => AppEvent::ReaderLoaded {
                url,
                generation,
                result: result.map_err(|e| e.to_string()),
            },
            Err(error) => AppEvent::TaskPanicked {
                task: TaskKind::Reader { url, generation },
                error,
            },
        };
        send_event(&tx, event).await;
    });
}

fn spawn_mark_read(services: &Services, id: String, tx: &mpsc::Sender<AppEvent>) {
    let Some(api) = services.api.clone() else {
        tracing::debug!(article_id = %id, "No API client, skipping mark as read");
        return;
    };
    let tx = tx.clone();

    tokio::spawn(async move {
        let result = catch_task_panic(api.mark_read(&id)).await;
        let event = match result {
            Ok(result) => AppEvent::MarkedRead {
                id,
                result: result.map_err(|e| e.to_string()),
            },
            Err(error) => AppEvent::TaskPanicked {
                task: TaskKind::MarkRead { id },
                error,
            },
        };
        send_event(&tx, event).await;
    });
}

/// Hands an article URL to the system browser. Fire-and-forget: only a
/// refused URL or a failed launch is reported, as a status message.
fn open_in_browser(app: &mut App, url: &str) {
    let validated = match validate_url_for_open(url) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Refusing to open URL");
            app.set_status(format!("Cannot open URL: {e}"));
            return;
        }
    };

    if let Err(e) = open::that_detached(validated.as_str()) {
        tracing::warn!(url = %validated, error = %e, "Failed to open browser");
        app.set_status("Failed to open browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartScreen;
    use crate::theme::ThemeName;

    fn services() -> Services {
        Services {
            api: None,
            reader: Arc::new(
                ContentClient::new(reqwest::Client::new(), "https://r.jina.ai", None).unwrap(),
            ),
        }
    }

    fn temp_store(name: &str) -> SettingsStore {
        let dir = std::env::temp_dir().join(format!("curak_helpers_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        SettingsStore::open(dir.join("config.json"))
    }

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_message() {
        let result = catch_task_panic(async {
            if true {
                panic!("exploded");
            }
        })
        .await;
        assert_eq!(result, Err("exploded".to_string()));
    }

    #[tokio::test]
    async fn test_article_load_without_token_reports_error() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        let mut store = temp_store("no_token");
        let effect = app.start();

        let flow = execute_effect(&mut app, effect, &services(), &mut store, &tx);
        assert!(matches!(flow, LoopControl::Continue));

        match rx.recv().await {
            Some(AppEvent::ArticlesLoaded { generation, result }) => {
                assert_eq!(generation, 1);
                assert_eq!(result, Err(NO_TOKEN_MESSAGE.to_string()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quit_effect_stops_loop() {
        let (tx, _rx) = mpsc::channel(1);
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        let mut store = temp_store("quit");
        let flow = execute_effect(&mut app, Effect::Quit, &services(), &mut store, &tx);
        assert!(matches!(flow, LoopControl::Quit));
    }

    #[tokio::test]
    async fn test_persist_theme_writes_settings() {
        let (tx, _rx) = mpsc::channel(1);
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        let mut store = temp_store("persist");
        execute_effect(
            &mut app,
            Effect::PersistTheme(ThemeName::Mono),
            &services(),
            &mut store,
            &tx,
        );
        assert_eq!(store.theme(), ThemeName::Mono);
        assert_eq!(SettingsStore::open(store.path()).theme(), ThemeName::Mono);
    }

    #[tokio::test]
    async fn test_open_rejects_non_http_url() {
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        open_in_browser(&mut app, "file:///etc/passwd");
        let status = app.status_message.as_ref().map(|(m, _)| m.to_string());
        assert!(status.is_some_and(|m| m.starts_with("Cannot open URL")));
    }

    #[tokio::test]
    async fn test_mark_read_without_token_is_noop() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        let mut store = temp_store("mark_noop");
        execute_effect(
            &mut app,
            Effect::MarkRead { id: "a".into() },
            &services(),
            &mut store,
            &tx,
        );
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
