//! The impure half of the Elm split: owns the terminal, drives the event
//! loop, and executes the effects the reducer returns.
//!
//! Async results all funnel through one inbox channel. Handlers are pure
//! async functions returning a `UiEvent`; `spawn_task` wraps them in a
//! `TaskStarted`/`TaskCompleted` lifecycle, minting the task id here so the
//! reducer only learns ids through those envelopes. The reducer has already
//! claimed each effect's task slot by the time it reaches `execute_effect`,
//! so nothing is gated on this side.
//!
//! - `inbox.rs` holds the channel aliases
//! - `handlers.rs` holds the HTTP round-trips

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use confab_core::api::ApiClient;
use confab_core::config::Config;
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::common::{TaskCompleted, TaskKind, TaskSeq, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while a task spinner animates or input is streaming in.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Tick cadence when nothing is happening, to keep CPU use down.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// The terminal is restored on drop, panic, or Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    /// Shared HTTP client handed to every handler.
    client: Arc<ApiClient>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    task_seq: TaskSeq,
    last_tick: Instant,
    /// Recent terminal input keeps the loop on the fast cadence.
    last_terminal_event: Instant,
}

impl TuiRuntime {
    pub fn new(config: Config, probe: bool) -> Result<Self> {
        let client = Arc::new(ApiClient::from_config(&config)?);

        // The panic hook must be in place before the alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let state = AppState::new(config, probe);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            client,
            inbox_tx,
            inbox_rx,
            task_seq: TaskSeq::default(),
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the event loop until the reducer asks to quit.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        // Initial page fetch; the probe timer only when requested
        self.execute_effect(UiEffect::LoadPage);
        if self.state.tui.probe {
            self.execute_effect(UiEffect::ScheduleProbe);
        }

        let result = self.event_loop();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let events = self.gather_events()?;
            dirty |= self.reduce_all(events);

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(frame, &self.state);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Feeds a batch of events through the reducer, executing the effects
    /// each one produces. Returns whether a render is due.
    ///
    /// A `Frame` event with the current terminal size goes first so layout
    /// is settled before keys and results are applied. Only `Tick` marks
    /// the screen dirty; everything else batches into the next tick's
    /// render, which caps the frame rate at the tick cadence.
    fn reduce_all(&mut self, events: Vec<UiEvent>) -> bool {
        let mut render_due = false;

        let size = match self.terminal.size() {
            Ok(size) => size,
            Err(_) => return render_due,
        };
        let frame = UiEvent::Frame {
            width: size.width,
            height: size.height,
        };

        for event in std::iter::once(frame).chain(events) {
            if matches!(&event, UiEvent::Terminal(_)) {
                self.last_terminal_event = Instant::now();
            }
            render_due |= matches!(&event, UiEvent::Tick);

            let effects = update::update(&mut self.state, event);
            for effect in effects {
                self.execute_effect(effect);
            }
        }

        render_due
    }

    /// Drains the inbox, polls the terminal, and emits `Tick` when the
    /// current cadence interval has elapsed.
    fn gather_events(&mut self) -> Result<Vec<UiEvent>> {
        let tick_interval = self.tick_interval();
        let mut events = Vec::new();

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick is due, unless there is already work;
        // then just sweep whatever input is buffered
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    /// Fast cadence while a task is in flight (the spinner animates) or
    /// the user was recently typing or scrolling; slow otherwise.
    fn tick_interval(&self) -> Duration {
        let recently_active = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        if self.state.tui.tasks.is_any_running() || recently_active {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        }
    }

    /// Spawns an async effect with no task lifecycle attached.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// Spawns a handler under a fresh task id, reporting `TaskStarted`
    /// through the inbox now and `TaskCompleted` when the future resolves.
    fn spawn_task<F, Fut>(&mut self, kind: TaskKind, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let id = self.task_seq.next_id();
        let tx = self.inbox_tx.clone();
        let _ = tx.send(UiEvent::TaskStarted {
            kind,
            started: TaskStarted { id },
        });
        tokio::spawn(async move {
            let inner = f().await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        let client = Arc::clone(&self.client);
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }

            UiEffect::LoadPage => {
                self.spawn_task(TaskKind::PageLoad, move || handlers::load_page(client));
            }
            UiEffect::SwitchSession { session_id } => {
                self.spawn_task(TaskKind::SessionSwitch, move || {
                    handlers::switch_then_fetch(client, session_id)
                });
            }
            UiEffect::CreateSession { temp_session_id } => {
                self.spawn_task(TaskKind::SessionCreate, move || {
                    handlers::create_then_fetch(client, temp_session_id)
                });
            }
            UiEffect::RenameSession { old_name, new_name } => {
                self.spawn_task(TaskKind::SessionRename, move || {
                    handlers::rename_session(client, old_name, new_name)
                });
            }
            UiEffect::DeleteSession { session_id } => {
                self.spawn_task(TaskKind::SessionDelete, move || {
                    handlers::delete_session(client, session_id)
                });
            }
            UiEffect::SaveSession => {
                self.spawn_task(TaskKind::SessionSave, move || handlers::save_session(client));
            }
            UiEffect::SendMessage { message } => {
                self.spawn_task(TaskKind::MessageSend, move || {
                    handlers::send_message(client, message)
                });
            }
            UiEffect::ContinueFromHistory { history_index } => {
                self.spawn_task(TaskKind::HistoryContinue, move || {
                    handlers::continue_then_fetch(client, history_index)
                });
            }
            UiEffect::RefreshLogs { delay } => {
                self.spawn_task(TaskKind::LogsRefresh, move || {
                    handlers::refresh_logs(client, delay)
                });
            }
            UiEffect::ScheduleProbe => {
                self.spawn_effect(handlers::probe_timer);
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
