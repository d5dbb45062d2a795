use crate::api::Article;
use crate::app::{wrap_content, App, AppEvent, Overlay, ReaderState, TaskKind};
use crate::content::ReaderContent;

/// Applies one background completion to the app state.
///
/// Completions are applied one at a time from the event loop, so handlers
/// never race each other. Stale completions are detected by their
/// generation (and URL, for the reader) and dropped.
pub fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ArticlesLoaded { generation, result } => {
            handle_articles_loaded(app, generation, result)
        }
        AppEvent::ReaderLoaded {
            url,
            generation,
            result,
        } => handle_reader_loaded(app, url, generation, result),
        AppEvent::MarkedRead { id, result } => handle_marked_read(app, id, result),
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task = ?task, error = %error, "Background task panicked");
            app.set_status(format!("Background task failed: {error}"));
            let message = format!("Internal error: {error}");
            match task {
                TaskKind::Articles { generation } => {
                    handle_articles_loaded(app, generation, Err(message))
                }
                TaskKind::Reader { url, generation } => {
                    handle_reader_loaded(app, url, generation, Err(message))
                }
                TaskKind::MarkRead { .. } => {}
            }
        }
    }
}

fn handle_articles_loaded(app: &mut App, generation: u64, result: Result<Vec<Article>, String>) {
    if generation != app.articles_generation {
        tracing::debug!(
            generation,
            current = app.articles_generation,
            "Discarding stale article load"
        );
        return;
    }

    app.loading = false;
    match result {
        Ok(articles) => {
            tracing::info!(count = articles.len(), "Article list replaced");
            app.articles = articles;
            app.error = None;
            app.clamp_selection();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Article load failed");
            app.error = Some(e);
        }
    }
}

fn handle_reader_loaded(
    app: &mut App,
    url: String,
    generation: u64,
    result: Result<ReaderContent, String>,
) {
    if let Ok(content) = &result {
        app.reader_cache.put(url.clone(), content.clone());
    }

    let inner_width = app.reader_geometry().inner_width;
    let view = match &mut app.overlay {
        Overlay::Reader(view) if view.url == url && view.generation == generation => view,
        _ => {
            tracing::debug!(url = %url, generation, "Discarding stale reader content");
            return;
        }
    };

    view.state = match result {
        Ok(content) => {
            let lines = wrap_content(&content, inner_width);
            ReaderState::Loaded { content, lines }
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Reader content failed to load");
            ReaderState::Failed(e)
        }
    };
    view.scroll.reset();
}

fn handle_marked_read(app: &mut App, id: String, result: Result<(), String>) {
    if let Err(e) = result {
        // Best-effort: the article stays and can be marked again.
        tracing::warn!(article_id = %id, error = %e, "Mark as read failed");
        return;
    }

    let Some(pos) = app.articles.iter().position(|a| a.id == id) else {
        tracing::debug!(article_id = %id, "Marked article no longer in list");
        return;
    };
    app.articles.remove(pos);
    if pos < app.selected {
        app.selected -= 1;
    }
    app.clamp_selection();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartScreen;
    use crate::keybindings::Action;
    use crate::theme::ThemeName;
    use pretty_assertions::assert_eq;

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {id}"),
            url: format!("https://example.com/{id}"),
            summary: String::new(),
            tags: Vec::new(),
            reading_time_minutes: 1,
        }
    }

    fn content(lines: usize) -> ReaderContent {
        ReaderContent {
            title: "Reader title".into(),
            byline: "Published today".into(),
            text_content: (0..lines)
                .map(|i| format!("line {i}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn app_with(ids: &[&str]) -> App {
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        app.start();
        handle_app_event(
            &mut app,
            AppEvent::ArticlesLoaded {
                generation: 1,
                result: Ok(ids.iter().map(|id| article(id)).collect()),
            },
        );
        app
    }

    #[test]
    fn test_articles_loaded_leaves_loading() {
        let app = app_with(&["a", "b"]);
        assert!(!app.loading);
        assert_eq!(app.articles.len(), 2);
        assert_eq!(app.error, None);
    }

    #[test]
    fn test_article_load_failure_sets_error() {
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        app.start();
        handle_app_event(
            &mut app,
            AppEvent::ArticlesLoaded {
                generation: 1,
                result: Err("Network error".into()),
            },
        );
        assert!(!app.loading);
        assert_eq!(app.error.as_deref(), Some("Network error"));
    }

    #[test]
    fn test_successful_refresh_clears_error() {
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        app.start();
        handle_app_event(
            &mut app,
            AppEvent::ArticlesLoaded {
                generation: 1,
                result: Err("down".into()),
            },
        );
        let effect = app.apply(Action::Refresh);
        assert_eq!(effect, Some(crate::app::Effect::LoadArticles { generation: 2 }));
        handle_app_event(
            &mut app,
            AppEvent::ArticlesLoaded {
                generation: 2,
                result: Ok(vec![article("x")]),
            },
        );
        assert_eq!(app.error, None);
        assert_eq!(app.articles.len(), 1);
    }

    #[test]
    fn test_stale_article_load_discarded() {
        let mut app = app_with(&["a"]);
        app.apply(Action::Refresh); // generation 2
        handle_app_event(
            &mut app,
            AppEvent::ArticlesLoaded {
                generation: 1,
                result: Ok(vec![]),
            },
        );
        assert!(app.loading);
        assert_eq!(app.articles.len(), 1);
    }

    #[test]
    fn test_reload_clamps_selection() {
        let mut app = app_with(&["a", "b", "c"]);
        app.selected = 2;
        app.apply(Action::Refresh);
        handle_app_event(
            &mut app,
            AppEvent::ArticlesLoaded {
                generation: 2,
                result: Ok(vec![article("z")]),
            },
        );
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_reader_content_applied_for_current_request() {
        let mut app = app_with(&["a"]);
        app.apply(Action::Select);
        handle_app_event(
            &mut app,
            AppEvent::ReaderLoaded {
                url: "https://example.com/a".into(),
                generation: 1,
                result: Ok(content(5)),
            },
        );
        let view = app.reader().unwrap();
        assert_eq!(view.line_count(), 5);
        assert!(matches!(view.state, ReaderState::Loaded { .. }));
    }

    #[test]
    fn test_reader_failure_keeps_overlay_open() {
        let mut app = app_with(&["a"]);
        app.apply(Action::Select);
        handle_app_event(
            &mut app,
            AppEvent::ReaderLoaded {
                url: "https://example.com/a".into(),
                generation: 1,
                result: Err("No readable content found".into()),
            },
        );
        assert_eq!(
            app.reader().map(|v| &v.state),
            Some(&ReaderState::Failed("No readable content found".into()))
        );
    }

    #[test]
    fn test_late_reader_completion_after_close_is_ignored() {
        let mut app = app_with(&["a"]);
        app.apply(Action::Select);
        app.apply(Action::Back);
        handle_app_event(
            &mut app,
            AppEvent::ReaderLoaded {
                url: "https://example.com/a".into(),
                generation: 1,
                result: Ok(content(3)),
            },
        );
        assert_eq!(app.overlay, Overlay::None);
        // Still cached for the next open
        assert_eq!(app.apply(Action::Select), None);
        assert_eq!(app.reader().map(|v| v.line_count()), Some(3));
    }

    #[test]
    fn test_reader_completion_for_superseded_request_is_ignored() {
        let mut app = app_with(&["a", "b"]);
        app.apply(Action::Select); // a, generation 1
        app.apply(Action::Back);
        app.apply(Action::NavDown);
        app.apply(Action::Select); // b, generation 2
        handle_app_event(
            &mut app,
            AppEvent::ReaderLoaded {
                url: "https://example.com/a".into(),
                generation: 1,
                result: Ok(content(3)),
            },
        );
        let view = app.reader().unwrap();
        assert_eq!(view.url, "https://example.com/b");
        assert_eq!(view.state, ReaderState::Loading);
    }

    #[test]
    fn test_mark_read_single_article() {
        let mut app = app_with(&["only"]);
        handle_app_event(
            &mut app,
            AppEvent::MarkedRead {
                id: "only".into(),
                result: Ok(()),
            },
        );
        assert!(app.articles.is_empty());
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_mark_read_last_article_moves_selection_up() {
        let mut app = app_with(&["a", "b", "c"]);
        app.selected = 2;
        handle_app_event(
            &mut app,
            AppEvent::MarkedRead {
                id: "c".into(),
                result: Ok(()),
            },
        );
        assert_eq!(app.selected, 1);
        assert_eq!(app.articles.len(), 2);
    }

    #[test]
    fn test_mark_read_above_selection_keeps_same_article() {
        let mut app = app_with(&["a", "b", "c"]);
        app.selected = 2;
        handle_app_event(
            &mut app,
            AppEvent::MarkedRead {
                id: "a".into(),
                result: Ok(()),
            },
        );
        assert_eq!(app.selected_article().map(|a| a.id.as_str()), Some("c"));
    }

    #[test]
    fn test_mark_read_failure_is_swallowed() {
        let mut app = app_with(&["a", "b"]);
        handle_app_event(
            &mut app,
            AppEvent::MarkedRead {
                id: "a".into(),
                result: Err("HTTP error: status 500".into()),
            },
        );
        assert_eq!(app.articles.len(), 2);
        assert_eq!(app.error, None);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_panicked_article_task_leaves_loading() {
        let mut app = App::new(ThemeName::Default, StartScreen::Unread);
        app.start();
        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: TaskKind::Articles { generation: 1 },
                error: "boom".into(),
            },
        );
        assert!(!app.loading);
        assert!(app.error.is_some());
        assert!(app.status_message.is_some());
    }
}
