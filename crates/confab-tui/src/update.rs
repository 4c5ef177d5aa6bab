//! Event reducer.
//!
//! `update()` is the single entry point for all state changes: it takes the
//! current `AppState` and a `UiEvent`, mutates state, and returns effects
//! for the runtime to execute. It never performs I/O itself.
//!
//! ## Event Flow
//!
//! ```text
//! UiEvent -> update() -> Vec<UiEffect> -> runtime executes
//!                |
//!                v
//!          state mutations (direct or via StateMutation lists)
//! ```
//!
//! Overlays get first claim on key events. Cross-slice changes requested by
//! overlays come back as `StateMutation` lists and are applied here.

use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::{ChatUiEvent, LogsUiEvent, SessionUiEvent, UiEvent};
use crate::features::sessions::mint_temp_session_id;
use crate::features::transcript::HistoryCell;
use crate::mutations::{
    InputMutation, LogsMutation, SessionsMutation, StateMutation, TranscriptMutation,
};
use crate::overlays::{
    ConfirmDeleteState, Overlay, OverlayRequest, OverlayTransition, OverlayUpdate, RenameState,
    SessionPickerState,
};
use crate::render;
use crate::state::{AppState, TuiState, PROBE_MESSAGE};

/// Lines scrolled per mouse wheel notch.
const MOUSE_SCROLL_LINES: i32 = 3;

/// Delay before the post-reply log refresh, giving the server time to
/// flush the recursion trace.
const REPLY_LOG_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Processes an event and returns effects to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let effects = dispatch(app, event);
    claim_task_slots(&mut app.tui, effects)
}

fn dispatch(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            Vec::new()
        }

        UiEvent::Frame { width, height } => {
            handle_frame(&mut app.tui, width, height);
            Vec::new()
        }

        UiEvent::Terminal(terminal_event) => handle_terminal_event(app, terminal_event),

        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            Vec::new()
        }

        UiEvent::TaskCompleted { kind, completed } => {
            app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            dispatch(app, *completed.result)
        }

        UiEvent::Session(session_event) => handle_session_event(&mut app.tui, session_event),
        UiEvent::Chat(chat_event) => handle_chat_event(&mut app.tui, chat_event),
        UiEvent::Logs(logs_event) => handle_logs_event(&mut app.tui, logs_event),
    }
}

/// Claims each effect's task slot before it leaves the reducer.
///
/// Two triggers for the same kind can arrive inside one input batch, before
/// the runtime has reported `TaskStarted` for the first. Claiming the slot
/// here makes the second trigger a no-op instead of a duplicate request.
fn claim_task_slots(tui: &mut TuiState, effects: Vec<UiEffect>) -> Vec<UiEffect> {
    effects
        .into_iter()
        .filter(|effect| match effect.task_kind() {
            Some(kind) => tui.tasks.claim(kind),
            None => true,
        })
        .collect()
}

/// Per-frame state updates: layout, scroll delta coalescing, line info.
fn handle_frame(tui: &mut TuiState, width: u16, height: u16) {
    let viewport_height = render::calculate_transcript_height(height);
    let width_changed = tui.transcript.terminal_size.0 != width;

    tui.transcript.update_layout((width, height), viewport_height);

    if width_changed {
        tui.transcript.wrap_cache.clear();
        tui.transcript.scroll.cell_line_info.clear();
    }

    // Rebuild line info when stale (cells changed, width changed, panel
    // toggled). Append paths clear it; emptiness is the rebuild signal.
    if tui.transcript.scroll.cell_line_info.is_empty() && !tui.transcript.cells.is_empty() {
        let content_width = render::transcript_area_width(width, tui.logs.visible);
        let counts = render::calculate_cell_line_counts(
            &tui.transcript,
            content_width,
            tui.spinner_frame,
            render::TRANSCRIPT_HORIZONTAL_OVERHEAD,
        );
        tui.transcript.scroll.update_cell_line_info(counts);
    }

    // Coalesced mouse scroll
    let delta = tui.transcript.scroll_accumulator.take_delta();
    if delta < 0 {
        tui.transcript.scroll_up(delta.unsigned_abs() as usize);
    } else if delta > 0 {
        tui.transcript.scroll_down(delta as usize);
    }
}

fn handle_terminal_event(app: &mut AppState, event: CrosstermEvent) -> Vec<UiEffect> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        CrosstermEvent::Mouse(mouse) => {
            handle_mouse(&mut app.tui, mouse);
            Vec::new()
        }
        CrosstermEvent::Paste(text) => {
            if app.overlay.is_none() {
                app.tui.input.insert_str(&text);
            }
            Vec::new()
        }
        CrosstermEvent::FocusGained => refresh_logs_now(&app.tui),
        CrosstermEvent::Resize(..) => {
            // Frame handling recomputes layout; drop stale wrapped lines
            app.tui.transcript.wrap_cache.clear();
            app.tui.transcript.scroll.cell_line_info.clear();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Overlays get first claim on keys
    if let Some(overlay) = app.overlay.as_mut() {
        let overlay_update = overlay.handle_key(&app.tui, key);
        return apply_overlay_update(app, overlay_update);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let tui = &mut app.tui;

    match key.code {
        KeyCode::Char('c') if ctrl => {
            tui.should_quit = true;
            return vec![UiEffect::Quit];
        }
        KeyCode::Char('n') if ctrl => {
            if tui.tasks.is_running(TaskKind::SessionCreate) {
                return Vec::new();
            }
            return vec![UiEffect::CreateSession {
                temp_session_id: mint_temp_session_id(),
            }];
        }
        KeyCode::Char('s') if ctrl => {
            if tui.tasks.is_running(TaskKind::SessionSave) {
                return Vec::new();
            }
            return vec![UiEffect::SaveSession];
        }
        KeyCode::Char('l') if ctrl => {
            apply_mutations(tui, vec![StateMutation::Logs(LogsMutation::ToggleVisible)]);
            return Vec::new();
        }
        KeyCode::Char('p') if ctrl => {
            let (picker, effects) = SessionPickerState::open(
                tui.sessions.sessions.clone(),
                tui.sessions.current.clone(),
            );
            app.overlay = Some(Overlay::SessionPicker(picker));
            return effects;
        }
        KeyCode::Enter => return submit_draft(tui),
        KeyCode::F(5) => return refresh_logs_now(tui),
        _ => {}
    }

    // Bare action characters only act on an empty draft; otherwise they type.
    if tui.input.is_empty() && !ctrl {
        match key.code {
            KeyCode::Char('c') => return continue_from_last_assistant(tui),
            KeyCode::Char('x') => {
                if tui.logs.visible {
                    apply_mutations(tui, vec![StateMutation::Logs(LogsMutation::Clear)]);
                }
                return Vec::new();
            }
            KeyCode::Char('g') => return refresh_logs_now(tui),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char(c) if !ctrl => tui.input.insert_char(c),
        KeyCode::Backspace => tui.input.backspace(),
        KeyCode::Delete => tui.input.delete(),
        KeyCode::Left => tui.input.move_left(),
        KeyCode::Right => tui.input.move_right(),
        KeyCode::Home => tui.input.move_home(),
        KeyCode::End => tui.input.move_end(),
        KeyCode::Up => tui.transcript.scroll_up(1),
        KeyCode::Down => tui.transcript.scroll_down(1),
        KeyCode::PageUp => tui.transcript.page_up(),
        KeyCode::PageDown => tui.transcript.page_down(),
        _ => {}
    }

    Vec::new()
}

fn handle_mouse(tui: &mut TuiState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            tui.transcript
                .scroll_accumulator
                .accumulate(-MOUSE_SCROLL_LINES);
        }
        MouseEventKind::ScrollDown => {
            tui.transcript
                .scroll_accumulator
                .accumulate(MOUSE_SCROLL_LINES);
        }
        _ => {}
    }
}

/// Submits the draft as a chat message.
///
/// Applies all submit mutations in one pass: the draft clears, the user
/// cell and pending placeholder appear, and the view jumps to the bottom
/// before the reply arrives.
fn submit_draft(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.input.is_blank() {
        return Vec::new();
    }
    if tui.tasks.is_running(TaskKind::MessageSend) || tui.transcript.has_pending() {
        return Vec::new();
    }

    let message = tui.input.text().trim().to_string();
    apply_mutations(
        tui,
        vec![
            StateMutation::Input(InputMutation::Clear),
            StateMutation::Transcript(TranscriptMutation::AppendCell(HistoryCell::user(
                &message,
            ))),
            StateMutation::Transcript(TranscriptMutation::AppendCell(HistoryCell::pending())),
            StateMutation::Transcript(TranscriptMutation::ScrollToBottom),
        ],
    );
    vec![UiEffect::SendMessage { message }]
}

/// Re-runs the conversation from the latest assistant turn.
fn continue_from_last_assistant(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.tasks.is_running(TaskKind::HistoryContinue) {
        return Vec::new();
    }
    let Some(cell_index) = tui
        .transcript
        .cells
        .iter()
        .rposition(|c| matches!(c, HistoryCell::Assistant { .. }))
    else {
        return Vec::new();
    };
    let Some(history_index) = tui.transcript.history_index_for(cell_index) else {
        return Vec::new();
    };
    vec![UiEffect::ContinueFromHistory { history_index }]
}

/// Immediate log refresh, gated on an in-flight refresh.
fn refresh_logs_now(tui: &TuiState) -> Vec<UiEffect> {
    if tui.tasks.is_running(TaskKind::LogsRefresh) {
        return Vec::new();
    }
    vec![UiEffect::RefreshLogs { delay: None }]
}

/// Appends a system notice and keeps the view pinned to it.
fn append_system(tui: &mut TuiState, message: String) {
    apply_mutations(
        tui,
        vec![
            StateMutation::Transcript(TranscriptMutation::AppendSystemMessage(message)),
            StateMutation::Transcript(TranscriptMutation::ScrollToBottom),
        ],
    );
}

fn handle_session_event(tui: &mut TuiState, event: SessionUiEvent) -> Vec<UiEffect> {
    match event {
        SessionUiEvent::PageLoaded { page } => {
            tui.apply_page(page);
            Vec::new()
        }

        SessionUiEvent::PageLoadFailed { error } => {
            append_system(tui, format!("请求失败: {error}"));
            Vec::new()
        }

        SessionUiEvent::RenameDone {
            old_name,
            entered,
            reply,
        } => {
            if reply.success {
                // The server may normalize the entered name
                let new_name = reply.new_session_id.unwrap_or(entered);
                apply_mutations(
                    tui,
                    vec![StateMutation::Sessions(SessionsMutation::PatchRenamed {
                        old_name,
                        new_name,
                    })],
                );
            } else {
                append_system(tui, reply.message.unwrap_or_else(|| "重命名失败".into()));
            }
            Vec::new()
        }

        SessionUiEvent::RenameFailed { error } => {
            append_system(tui, format!("请求失败: {error}"));
            Vec::new()
        }

        SessionUiEvent::DeleteDone { session_id, reply } => {
            if reply.success {
                apply_mutations(
                    tui,
                    vec![StateMutation::Sessions(SessionsMutation::Remove {
                        session_id,
                    })],
                );
            } else {
                append_system(tui, reply.message.unwrap_or_else(|| "删除失败".into()));
            }
            Vec::new()
        }

        SessionUiEvent::DeleteFailed { error } => {
            append_system(tui, format!("请求失败: {error}"));
            Vec::new()
        }

        SessionUiEvent::SaveDone { reply } => {
            if let Some(session_id) = reply.session_id {
                apply_mutations(
                    tui,
                    vec![StateMutation::Sessions(SessionsMutation::SetCurrent {
                        session_id,
                    })],
                );
            }
            append_system(tui, reply.message);
            Vec::new()
        }

        SessionUiEvent::SaveFailed { error } => {
            append_system(tui, format!("请求失败: {error}"));
            Vec::new()
        }
    }
}

fn handle_chat_event(tui: &mut TuiState, event: ChatUiEvent) -> Vec<UiEffect> {
    match event {
        ChatUiEvent::ReplyReceived { markdown } => {
            apply_mutations(
                tui,
                vec![
                    StateMutation::Transcript(TranscriptMutation::RemovePending),
                    StateMutation::Transcript(TranscriptMutation::AppendCell(
                        HistoryCell::assistant(markdown),
                    )),
                    StateMutation::Transcript(TranscriptMutation::ScrollToBottom),
                ],
            );
            // The recursion trace lags the reply slightly
            if tui.tasks.is_running(TaskKind::LogsRefresh) {
                Vec::new()
            } else {
                vec![UiEffect::RefreshLogs {
                    delay: Some(REPLY_LOG_REFRESH_DELAY),
                }]
            }
        }

        ChatUiEvent::SendFailed { error } => {
            apply_mutations(
                tui,
                vec![StateMutation::Transcript(TranscriptMutation::RemovePending)],
            );
            append_system(tui, format!("发送失败: {error}"));
            Vec::new()
        }

        ChatUiEvent::ContinueFailed { error } => {
            append_system(tui, format!("请求失败: {error}"));
            Vec::new()
        }

        ChatUiEvent::ProbeFire => {
            tui.input.set_text(PROBE_MESSAGE);
            submit_draft(tui)
        }
    }
}

fn handle_logs_event(tui: &mut TuiState, event: LogsUiEvent) -> Vec<UiEffect> {
    match event {
        LogsUiEvent::Fetched { entries } => {
            apply_mutations(tui, vec![StateMutation::Logs(LogsMutation::Replace(entries))]);
            Vec::new()
        }
        LogsUiEvent::FetchFailed { error } => {
            tracing::error!(error = %error, "recursion log fetch failed");
            tui.logs.set_error("加载递归日志时出错");
            Vec::new()
        }
    }
}

/// Applies cross-slice mutations in order.
pub fn apply_mutations(tui: &mut TuiState, mutations: Vec<StateMutation>) {
    for mutation in mutations {
        match mutation {
            StateMutation::Transcript(m) => apply_transcript_mutation(tui, m),
            StateMutation::Input(m) => match m {
                InputMutation::Clear => tui.input.clear(),
                InputMutation::SetText(text) => tui.input.set_text(text),
            },
            StateMutation::Sessions(m) => match m {
                SessionsMutation::Replace { sessions, current } => {
                    tui.sessions.replace(sessions, current);
                }
                SessionsMutation::PatchRenamed { old_name, new_name } => {
                    tui.sessions.patch_renamed(&old_name, &new_name);
                }
                SessionsMutation::Remove { session_id } => tui.sessions.remove(&session_id),
                SessionsMutation::SetCurrent { session_id } => {
                    tui.sessions.set_current(&session_id);
                }
            },
            StateMutation::Logs(m) => match m {
                LogsMutation::Replace(entries) => {
                    tui.logs.apply_fetch(entries);
                }
                LogsMutation::Clear => tui.logs.clear(),
                LogsMutation::SetError(message) => tui.logs.set_error(message),
                LogsMutation::ToggleVisible => {
                    tui.logs.toggle_visible();
                    // The transcript area changes width with the panel
                    tui.transcript.wrap_cache.clear();
                    tui.transcript.scroll.cell_line_info.clear();
                }
            },
        }
    }
}

fn apply_transcript_mutation(tui: &mut TuiState, mutation: TranscriptMutation) {
    let transcript = &mut tui.transcript;
    match mutation {
        TranscriptMutation::AppendCell(cell) => {
            transcript.push_cell(cell);
            transcript.scroll.cell_line_info.clear();
        }
        TranscriptMutation::AppendSystemMessage(message) => {
            transcript.push_cell(HistoryCell::system(message));
            transcript.scroll.cell_line_info.clear();
        }
        TranscriptMutation::RemovePending => {
            if transcript.remove_pending() {
                transcript.scroll.cell_line_info.clear();
            }
        }
        TranscriptMutation::Clear => transcript.reset(),
        TranscriptMutation::ReplaceCells(cells) => {
            transcript.reset();
            for cell in cells {
                transcript.push_cell(cell);
            }
        }
        TranscriptMutation::ResetScroll => transcript.scroll.reset(),
        TranscriptMutation::ClearWrapCache => transcript.wrap_cache.clear(),
        TranscriptMutation::ScrollToTop => transcript.scroll_to_top(),
        TranscriptMutation::ScrollToBottom => transcript.scroll_to_bottom(),
        TranscriptMutation::PageUp => transcript.page_up(),
        TranscriptMutation::PageDown => transcript.page_down(),
    }
}

fn apply_overlay_update(app: &mut AppState, overlay_update: OverlayUpdate) -> Vec<UiEffect> {
    let OverlayUpdate {
        transition,
        mutations,
        mut effects,
    } = overlay_update;

    apply_mutations(&mut app.tui, mutations);

    match transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => app.overlay = None,
        OverlayTransition::Open(request) => {
            let (overlay, open_effects) = open_overlay_request(&app.tui, request);
            app.overlay = Some(overlay);
            effects.extend(open_effects);
        }
    }

    effects
}

fn open_overlay_request(tui: &TuiState, request: OverlayRequest) -> (Overlay, Vec<UiEffect>) {
    match request {
        OverlayRequest::SessionPicker => {
            let (picker, effects) = SessionPickerState::open(
                tui.sessions.sessions.clone(),
                tui.sessions.current.clone(),
            );
            (Overlay::SessionPicker(picker), effects)
        }
        OverlayRequest::Rename { session_id } => {
            (Overlay::Rename(RenameState::open(session_id)), Vec::new())
        }
        OverlayRequest::ConfirmDelete { session_id } => (
            Overlay::ConfirmDelete(ConfirmDeleteState::open(session_id)),
            Vec::new(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::config::Config;
    use confab_core::wire::{HistoryTurn, PageState, Role, SaveReply, StatusReply};

    fn app() -> AppState {
        AppState::new(Config::default(), false)
    }

    fn press(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(CrosstermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> UiEvent {
        UiEvent::Terminal(CrosstermEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            update(app, press(KeyCode::Char(c)));
        }
    }

    fn started(app: &mut AppState, kind: TaskKind) {
        app.tui
            .tasks
            .state_mut(kind)
            .on_started(&crate::common::TaskStarted {
                id: crate::common::TaskId(1),
            });
    }

    #[test]
    fn test_submit_clears_input_and_appends_user_and_pending() {
        let mut app = app();
        type_text(&mut app, "  你好  ");

        let effects = update(&mut app, press(KeyCode::Enter));

        assert!(app.tui.input.is_empty());
        assert_eq!(app.tui.transcript.cells.len(), 2);
        assert!(matches!(
            &app.tui.transcript.cells[0],
            HistoryCell::User { content, .. } if content == "你好"
        ));
        assert!(app.tui.transcript.cells[1].is_pending());
        assert!(app.tui.transcript.scroll.is_following());
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SendMessage { message }] if message == "你好"
        ));
    }

    #[test]
    fn test_blank_draft_submit_is_silent_noop() {
        let mut app = app();
        type_text(&mut app, "   ");

        let effects = update(&mut app, press(KeyCode::Enter));

        assert!(effects.is_empty());
        assert!(app.tui.transcript.cells.is_empty());
        // The draft is kept; nothing was submitted
        assert_eq!(app.tui.input.text(), "   ");
    }

    #[test]
    fn test_double_enter_sends_once() {
        let mut app = app();
        type_text(&mut app, "hi");
        let first = update(&mut app, press(KeyCode::Enter));
        assert_eq!(first.len(), 1);
        started(&mut app, TaskKind::MessageSend);

        type_text(&mut app, "again");
        let second = update(&mut app, press(KeyCode::Enter));

        assert!(second.is_empty());
        // Second draft stays in the input
        assert_eq!(app.tui.input.text(), "again");
    }

    #[test]
    fn test_reply_swaps_pending_for_assistant_and_schedules_log_refresh() {
        let mut app = app();
        type_text(&mut app, "q");
        update(&mut app, press(KeyCode::Enter));
        assert!(app.tui.transcript.has_pending());

        let effects = update(
            &mut app,
            UiEvent::Chat(ChatUiEvent::ReplyReceived {
                markdown: "**bold** answer".into(),
            }),
        );

        assert!(!app.tui.transcript.has_pending());
        assert_eq!(app.tui.transcript.cells.len(), 2);
        assert!(matches!(
            &app.tui.transcript.cells[1],
            HistoryCell::Assistant { content, .. } if content == "**bold** answer"
        ));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::RefreshLogs { delay: Some(d) }] if *d == REPLY_LOG_REFRESH_DELAY
        ));
    }

    #[test]
    fn test_send_failure_removes_pending_and_shows_system_cell() {
        let mut app = app();
        type_text(&mut app, "q");
        update(&mut app, press(KeyCode::Enter));

        update(
            &mut app,
            UiEvent::Chat(ChatUiEvent::SendFailed {
                error: "connection refused".into(),
            }),
        );

        assert!(!app.tui.transcript.has_pending());
        assert!(matches!(
            app.tui.transcript.cells.last(),
            Some(HistoryCell::System { content, .. }) if content.contains("connection refused")
        ));
    }

    #[test]
    fn test_rename_success_patches_list_in_place() {
        let mut app = app();
        app.tui
            .sessions
            .replace(vec!["a".into(), "b".into()], "a".into());

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::RenameDone {
                old_name: "b".into(),
                entered: "c".into(),
                reply: StatusReply {
                    success: true,
                    message: None,
                    new_session_id: None,
                },
            }),
        );

        assert_eq!(app.tui.sessions.sessions, vec!["a", "c"]);
    }

    #[test]
    fn test_rename_server_assigned_name_wins() {
        let mut app = app();
        app.tui.sessions.replace(vec!["b".into()], "b".into());

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::RenameDone {
                old_name: "b".into(),
                entered: "typed".into(),
                reply: StatusReply {
                    success: true,
                    message: None,
                    new_session_id: Some("server_name".into()),
                },
            }),
        );

        assert_eq!(app.tui.sessions.sessions, vec!["server_name"]);
        assert_eq!(app.tui.sessions.current, "server_name");
    }

    #[test]
    fn test_rename_refusal_shows_server_message_verbatim() {
        let mut app = app();
        app.tui.sessions.replace(vec!["b".into()], "b".into());

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::RenameDone {
                old_name: "b".into(),
                entered: "c".into(),
                reply: StatusReply {
                    success: false,
                    message: Some("会话名称已存在".into()),
                    new_session_id: None,
                },
            }),
        );

        assert_eq!(app.tui.sessions.sessions, vec!["b"]);
        assert!(matches!(
            app.tui.transcript.cells.last(),
            Some(HistoryCell::System { content, .. }) if content == "会话名称已存在"
        ));
    }

    #[test]
    fn test_delete_success_removes_exactly_one_entry() {
        let mut app = app();
        app.tui
            .sessions
            .replace(vec!["a".into(), "b".into()], "a".into());

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::DeleteDone {
                session_id: "b".into(),
                reply: StatusReply {
                    success: true,
                    message: None,
                    new_session_id: None,
                },
            }),
        );

        assert_eq!(app.tui.sessions.sessions, vec!["a"]);
    }

    #[test]
    fn test_delete_refusal_keeps_list_and_shows_message() {
        let mut app = app();
        app.tui.sessions.replace(vec!["a".into()], "a".into());

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::DeleteDone {
                session_id: "a".into(),
                reply: StatusReply {
                    success: false,
                    message: Some("不能删除当前正在使用的会话".into()),
                    new_session_id: None,
                },
            }),
        );

        assert_eq!(app.tui.sessions.sessions, vec!["a"]);
        assert!(matches!(
            app.tui.transcript.cells.last(),
            Some(HistoryCell::System { content, .. })
                if content == "不能删除当前正在使用的会话"
        ));
    }

    #[test]
    fn test_save_adopts_server_title_and_shows_message() {
        let mut app = app();
        app.tui
            .sessions
            .replace(vec!["新会话_123".into()], "新会话_123".into());

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::SaveDone {
                reply: SaveReply {
                    message: "会话已保存".into(),
                    session_id: Some("今天聊了什么".into()),
                },
            }),
        );

        assert_eq!(app.tui.sessions.current, "今天聊了什么");
        assert_eq!(app.tui.sessions.sessions, vec!["今天聊了什么"]);
        assert!(matches!(
            app.tui.transcript.cells.last(),
            Some(HistoryCell::System { content, .. }) if content == "会话已保存"
        ));
    }

    #[test]
    fn test_page_loaded_replaces_everything() {
        let mut app = app();
        app.tui.transcript.push_cell(HistoryCell::system("stale"));

        update(
            &mut app,
            UiEvent::Session(SessionUiEvent::PageLoaded {
                page: PageState {
                    sessions: vec!["s1".into()],
                    current_session: "s1".into(),
                    history: vec![HistoryTurn {
                        role: Role::User,
                        text: "hi".into(),
                    }],
                    recursion_logs: Vec::new(),
                },
            }),
        );

        assert_eq!(app.tui.transcript.cells.len(), 1);
        assert_eq!(app.tui.sessions.current, "s1");
    }

    #[test]
    fn test_continue_uses_last_assistant_history_index() {
        let mut app = app();
        app.tui.transcript.push_cell(HistoryCell::user("q1"));
        app.tui
            .transcript
            .push_cell(HistoryCell::assistant_at("a1", 1));
        app.tui.transcript.push_cell(HistoryCell::system("note"));

        let effects = update(&mut app, press(KeyCode::Char('c')));

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::ContinueFromHistory { history_index: 1 }]
        ));
    }

    #[test]
    fn test_continue_with_text_in_draft_types_instead() {
        let mut app = app();
        app.tui.transcript.push_cell(HistoryCell::assistant_at("a", 0));
        type_text(&mut app, "draft");

        let effects = update(&mut app, press(KeyCode::Char('c')));

        assert!(effects.is_empty());
        assert_eq!(app.tui.input.text(), "draftc");
    }

    #[test]
    fn test_logs_clear_is_client_side_only() {
        let mut app = app();
        app.tui.logs.visible = true;
        app.tui.logs.apply_fetch(vec![confab_core::wire::LogEntry {
            timestamp: "10:00:00".into(),
            level: "INFO".into(),
            function: "recurse".into(),
            params: None,
            result: None,
            tool_name: None,
            source: None,
        }]);

        let effects = update(&mut app, press(KeyCode::Char('x')));

        assert!(effects.is_empty());
        assert!(app.tui.logs.entries.is_empty());
    }

    #[test]
    fn test_logs_fetch_failure_sets_error_and_keeps_entries() {
        let mut app = app();
        app.tui.logs.apply_fetch(vec![confab_core::wire::LogEntry {
            timestamp: "10:00:00".into(),
            level: "INFO".into(),
            function: "recurse".into(),
            params: None,
            result: None,
            tool_name: None,
            source: None,
        }]);

        update(
            &mut app,
            UiEvent::Logs(LogsUiEvent::FetchFailed {
                error: "timeout".into(),
            }),
        );

        assert_eq!(app.tui.logs.entries.len(), 1);
        assert_eq!(app.tui.logs.error.as_deref(), Some("加载递归日志时出错"));
    }

    #[test]
    fn test_probe_fire_submits_canned_message() {
        let mut app = app();

        let effects = update(&mut app, UiEvent::Chat(ChatUiEvent::ProbeFire));

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SendMessage { message }] if message == PROBE_MESSAGE
        ));
        assert!(app.tui.transcript.has_pending());
    }

    #[test]
    fn test_task_lifecycle_gates_and_clears() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::LogsRefresh,
                started: crate::common::TaskStarted {
                    id: crate::common::TaskId(7),
                },
            },
        );
        assert!(app.tui.tasks.is_running(TaskKind::LogsRefresh));

        // Manual refresh while one is in flight is dropped
        let effects = update(&mut app, press(KeyCode::F(5)));
        assert!(effects.is_empty());

        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::LogsRefresh,
                completed: crate::common::TaskCompleted {
                    id: crate::common::TaskId(7),
                    result: Box::new(UiEvent::Logs(LogsUiEvent::Fetched {
                        entries: Vec::new(),
                    })),
                },
            },
        );
        assert!(!app.tui.tasks.is_running(TaskKind::LogsRefresh));
    }

    #[test]
    fn test_rapid_double_ctrl_n_creates_one_session() {
        let mut app = app();

        let first = update(&mut app, ctrl('n'));
        assert!(matches!(
            first.as_slice(),
            [UiEffect::CreateSession { .. }]
        ));

        // Key repeat can buffer a second press into the same input batch,
        // arriving before the runtime reports the spawned task.
        let second = update(&mut app, ctrl('n'));
        assert!(second.is_empty());
    }

    #[test]
    fn test_buffered_refresh_keys_fetch_once() {
        let mut app = app();

        let first = update(&mut app, press(KeyCode::F(5)));
        assert!(matches!(
            first.as_slice(),
            [UiEffect::RefreshLogs { delay: None }]
        ));

        let second = update(&mut app, press(KeyCode::Char('g')));
        assert!(second.is_empty());
    }

    #[test]
    fn test_ctrl_n_mints_temp_session_id() {
        let mut app = app();

        let effects = update(&mut app, ctrl('n'));

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::CreateSession { temp_session_id }]
                if temp_session_id.starts_with("新会话_")
        ));
    }

    #[test]
    fn test_ctrl_p_opens_session_picker() {
        let mut app = app();
        app.tui
            .sessions
            .replace(vec!["a".into(), "b".into()], "b".into());

        update(&mut app, ctrl('p'));

        assert!(matches!(app.overlay, Some(Overlay::SessionPicker(_))));
    }

    #[test]
    fn test_overlay_enter_switches_session_and_closes() {
        let mut app = app();
        app.tui
            .sessions
            .replace(vec!["a".into(), "b".into()], "a".into());
        update(&mut app, ctrl('p'));

        let effects = update(&mut app, press(KeyCode::Enter));

        assert!(app.overlay.is_none());
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SwitchSession { session_id }] if session_id == "a"
        ));
    }

    #[test]
    fn test_confirm_cancel_reopens_picker() {
        let mut app = app();
        app.tui.sessions.replace(vec!["a".into()], "a".into());
        update(&mut app, ctrl('p'));
        update(&mut app, press(KeyCode::Char('d')));
        assert!(matches!(app.overlay, Some(Overlay::ConfirmDelete(_))));

        update(&mut app, press(KeyCode::Esc));
        assert!(matches!(app.overlay, Some(Overlay::SessionPicker(_))));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        let effects = update(&mut app, ctrl('c'));
        assert!(app.tui.should_quit);
        assert!(matches!(effects.as_slice(), [UiEffect::Quit]));
    }

    #[test]
    fn test_toggle_logs_invalidates_layout() {
        let mut app = app();
        app.tui.transcript.push_cell(HistoryCell::user("hi"));
        update(&mut app, UiEvent::Frame { width: 80, height: 24 });
        assert!(!app.tui.transcript.scroll.cell_line_info.is_empty());

        update(&mut app, ctrl('l'));

        assert!(app.tui.logs.visible);
        assert!(app.tui.transcript.scroll.cell_line_info.is_empty());
    }

    #[test]
    fn test_frame_rebuilds_cell_line_info() {
        let mut app = app();
        app.tui.transcript.push_cell(HistoryCell::user("hello"));
        app.tui.transcript.push_cell(HistoryCell::assistant("world"));

        update(&mut app, UiEvent::Frame { width: 80, height: 24 });

        assert_eq!(app.tui.transcript.scroll.cell_line_info.len(), 2);
        assert!(app.tui.transcript.scroll.cached_line_count > 0);
    }
}
