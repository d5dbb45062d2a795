//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task completions and a periodic
//! tick. All state changes happen here, on one task, one event at a time.

use crate::app::{App, AppEvent};
use crate::config::SettingsStore;
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::{execute_effect, Services};
use super::input::handle_input;
use super::render::draw;

/// Spinner and status-expiry cadence.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Whether the event loop keeps going after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    /// Leave the loop and restore the terminal.
    Quit,
}

/// Runs the dashboard until the user quits or a termination signal arrives.
///
/// Installs a panic hook that restores the terminal before the default hook
/// prints, so a panic never leaves the shell in raw mode.
pub async fn run(
    app: &mut App,
    services: Services,
    settings: &mut SettingsStore,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let size = terminal.size()?;
    app.resize(usize::from(size.width), usize::from(size.height));

    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let first_load = app.start();
    execute_effect(app, first_load, &services, settings, &event_tx);

    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal.draw(|f| draw(f, app))?;
            needs_redraw = false;
        }

        // Drain finished tasks first so results show up even under key spam
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
            needs_redraw = true;
        }
        if needs_redraw {
            continue;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }

            maybe_event = event_stream.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    needs_redraw = true;
                    let flow = handle_input(
                        app,
                        key.code,
                        key.modifiers,
                        &services,
                        settings,
                        &event_tx,
                    );
                    if flow == LoopControl::Quit {
                        break;
                    }
                }
                Some(Ok(Event::Resize(width, height))) => {
                    tracing::debug!(width, height, "Terminal resized");
                    app.resize(usize::from(width), usize::from(height));
                    needs_redraw = true;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Terminal event error");
                }
                None => {
                    tracing::warn!("Terminal event stream closed");
                    break;
                }
            },

            Some(event) = event_rx.recv() => {
                handle_app_event(app, event);
                needs_redraw = true;
            }

            _ = tick_interval.tick() => {
                if app.on_tick() {
                    needs_redraw = true;
                }
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
