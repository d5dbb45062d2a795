//! Navigation state and the controller that mutates it.
//!
//! [`App`] is the single source of truth for what is on screen. Keys reach it
//! as [`Action`]s through [`App::apply`], which mutates state and returns at
//! most one [`Effect`] for the UI layer to carry out. Background work reports
//! back as [`AppEvent`]s, applied one at a time by `ui::events`.

use crate::api::Article;
use crate::config::StartScreen;
use crate::content::ReaderContent;
use crate::keybindings::{Action, Context, KeybindingRegistry};
use crate::theme::{Theme, ThemeName};
use crate::ui::layout::{self, ReaderGeometry};
use crate::ui::scroll::{ScrollState, LINE_STEP, PAGE_STEP};
use crate::util::wrap;
use lru::LruCache;
use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// How long a status message stays in the footer.
pub const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Spinner frames shown while loading.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Extracted articles kept in memory, keyed by URL.
const READER_CACHE_SIZE: usize = 32;

// ============================================================================
// Events and effects
// ============================================================================

/// Which background task a panic came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Articles { generation: u64 },
    Reader { url: String, generation: u64 },
    MarkRead { id: String },
}

/// Completions delivered from background tasks to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    ArticlesLoaded {
        generation: u64,
        result: Result<Vec<Article>, String>,
    },
    ReaderLoaded {
        url: String,
        generation: u64,
        result: Result<ReaderContent, String>,
    },
    MarkedRead {
        id: String,
        result: Result<(), String>,
    },
    TaskPanicked {
        task: TaskKind,
        error: String,
    },
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    LoadArticles { generation: u64 },
    LoadReader { url: String, generation: u64 },
    MarkRead { id: String },
    OpenUrl(String),
    PersistTheme(ThemeName),
}

// ============================================================================
// Overlay state
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
    Loading,
    Loaded {
        content: ReaderContent,
        /// Body wrapped to the reader's inner width
        lines: Vec<String>,
    },
    Failed(String),
}

/// The reader overlay, bound to the request that opened it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderView {
    pub url: String,
    /// Article title from the list, shown until content arrives
    pub title: String,
    pub generation: u64,
    pub state: ReaderState,
    pub scroll: ScrollState,
}

impl ReaderView {
    pub fn line_count(&self) -> usize {
        match &self.state {
            ReaderState::Loaded { lines, .. } => lines.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Reader(ReaderView),
    ThemePicker {
        index: usize,
    },
}

/// Wraps every body line to `width`. Each source line yields at least one row.
pub fn wrap_content(content: &ReaderContent, width: usize) -> Vec<String> {
    content
        .text_content
        .lines()
        .flat_map(|line| wrap(line, width))
        .collect()
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub articles: Vec<Article>,
    pub selected: usize,
    pub overlay: Overlay,
    /// True while the article list is being fetched
    pub loading: bool,
    pub error: Option<String>,
    pub theme: Theme,
    pub start_screen: StartScreen,
    pub keybindings: KeybindingRegistry,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub spinner_frame: usize,
    pub width: usize,
    pub height: usize,
    pub(crate) articles_generation: u64,
    pub(crate) reader_generation: u64,
    pub(crate) reader_cache: LruCache<String, ReaderContent>,
}

impl App {
    pub fn new(theme: ThemeName, start_screen: StartScreen) -> Self {
        let cache_size = NonZeroUsize::new(READER_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            articles: Vec::new(),
            selected: 0,
            overlay: Overlay::None,
            loading: true,
            error: None,
            theme: theme.theme(),
            start_screen,
            keybindings: KeybindingRegistry::new(),
            status_message: None,
            spinner_frame: 0,
            width: 80,
            height: 24,
            articles_generation: 0,
            reader_generation: 0,
            reader_cache: LruCache::new(cache_size),
        }
    }

    /// Kicks off the first article load.
    pub fn start(&mut self) -> Effect {
        self.begin_refresh()
    }

    /// Dispatch context for the keybinding registry.
    pub fn context(&self) -> Context {
        match self.overlay {
            Overlay::Reader(_) => Context::Reader,
            Overlay::ThemePicker { .. } => Context::ThemePicker,
            Overlay::None if self.loading || self.error.is_some() => Context::Global,
            Overlay::None => Context::List,
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.articles.get(self.selected)
    }

    pub fn reader(&self) -> Option<&ReaderView> {
        match &self.overlay {
            Overlay::Reader(view) => Some(view),
            _ => None,
        }
    }

    pub fn reader_geometry(&self) -> ReaderGeometry {
        layout::reader(self.width, self.height)
    }

    pub fn total_reading_minutes(&self) -> u32 {
        self.articles.iter().map(|a| a.reading_time_minutes).sum()
    }

    pub fn is_reader_loading(&self) -> bool {
        matches!(
            &self.overlay,
            Overlay::Reader(ReaderView {
                state: ReaderState::Loading,
                ..
            })
        )
    }

    /// Keeps `selected` inside the article list.
    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.articles.len().saturating_sub(1));
        debug_assert!(self.selected < self.articles.len().max(1));
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if older than [`STATUS_DURATION`].
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_DURATION {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Periodic tick: expires status and advances the spinner.
    /// Returns true if anything visible changed.
    pub fn on_tick(&mut self) -> bool {
        let mut changed = self.clear_expired_status();
        if self.loading || self.is_reader_loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            changed = true;
        }
        changed
    }

    /// Records a new terminal size and re-fits the reader to it.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let geometry = self.reader_geometry();
        if let Overlay::Reader(view) = &mut self.overlay {
            if let ReaderState::Loaded { content, lines } = &mut view.state {
                *lines = wrap_content(content, geometry.inner_width);
            }
            let total = view.line_count();
            view.scroll.clamp(total, geometry.body_rows);
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Applies one user action. Returns the side effect to perform, if any.
    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        match self.context() {
            Context::Reader => self.apply_reader(action),
            Context::ThemePicker => self.apply_theme_picker(action),
            Context::List => self.apply_list(action),
            Context::Global => match action {
                Action::Quit => Some(Effect::Quit),
                Action::Refresh if !self.loading => Some(self.begin_refresh()),
                _ => None,
            },
        }
    }

    fn apply_list(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Quit => Some(Effect::Quit),
            Action::NavDown => {
                if !self.articles.is_empty() {
                    self.selected = (self.selected + 1).min(self.articles.len() - 1);
                }
                None
            }
            Action::NavUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            Action::Select => {
                let article = self.selected_article()?;
                let (url, title) = (article.url.clone(), article.title.clone());
                self.open_reader(url, title)
            }
            Action::MarkRead => self
                .selected_article()
                .map(|a| Effect::MarkRead { id: a.id.clone() }),
            Action::OpenInBrowser => self
                .selected_article()
                .map(|a| Effect::OpenUrl(a.url.clone())),
            Action::Refresh => Some(self.begin_refresh()),
            Action::OpenThemePicker => {
                self.overlay = Overlay::ThemePicker {
                    index: self.theme.name.index(),
                };
                None
            }
            _ => None,
        }
    }

    fn apply_reader(&mut self, action: Action) -> Option<Effect> {
        let rows = self.reader_geometry().body_rows;
        let Overlay::Reader(view) = &mut self.overlay else {
            return None;
        };
        let total = view.line_count();
        match action {
            Action::ScrollDown => view.scroll.scroll_by(LINE_STEP, total, rows),
            Action::ScrollUp => view.scroll.scroll_by(-LINE_STEP, total, rows),
            Action::PageDown => view.scroll.scroll_by(PAGE_STEP, total, rows),
            Action::PageUp => view.scroll.scroll_by(-PAGE_STEP, total, rows),
            Action::OpenInBrowser => return Some(Effect::OpenUrl(view.url.clone())),
            Action::Back => {
                tracing::debug!(url = %view.url, "Closing reader");
                self.overlay = Overlay::None;
            }
            Action::Quit => return Some(Effect::Quit),
            _ => {}
        }
        None
    }

    fn apply_theme_picker(&mut self, action: Action) -> Option<Effect> {
        let Overlay::ThemePicker { index } = &mut self.overlay else {
            return None;
        };
        match action {
            Action::NavDown => *index = (*index + 1).min(ThemeName::ALL.len() - 1),
            Action::NavUp => *index = index.saturating_sub(1),
            Action::Select => {
                let name = ThemeName::from_index(*index).unwrap_or_default();
                self.overlay = Overlay::None;
                self.theme = name.theme();
                self.set_status(format!("Theme: {name}"));
                return Some(Effect::PersistTheme(name));
            }
            Action::Back => self.overlay = Overlay::None,
            Action::Quit => return Some(Effect::Quit),
            _ => {}
        }
        None
    }

    /// Starts a new article load; completions from older loads are dropped.
    fn begin_refresh(&mut self) -> Effect {
        self.articles_generation += 1;
        self.loading = true;
        tracing::debug!(generation = self.articles_generation, "Refreshing articles");
        Effect::LoadArticles {
            generation: self.articles_generation,
        }
    }

    /// Opens the reader on `url`, from cache when possible.
    fn open_reader(&mut self, url: String, title: String) -> Option<Effect> {
        self.reader_generation += 1;
        let generation = self.reader_generation;

        if let Some(content) = self.reader_cache.get(&url).cloned() {
            tracing::debug!(url = %url, "Reader cache hit");
            let lines = wrap_content(&content, self.reader_geometry().inner_width);
            self.overlay = Overlay::Reader(ReaderView {
                url,
                title,
                generation,
                state: ReaderState::Loaded { content, lines },
                scroll: ScrollState::default(),
            });
            return None;
        }

        self.overlay = Overlay::Reader(ReaderView {
            url: url.clone(),
            title,
            generation,
            state: ReaderState::Loading,
            scroll: ScrollState::default(),
        });
        Some(Effect::LoadReader { url, generation })
    }
}
