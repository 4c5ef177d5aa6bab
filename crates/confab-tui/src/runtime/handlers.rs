//! Effect handler implementations.
//!
//! Handlers are pure async functions: they take what they need, do the I/O,
//! and return the `UiEvent` carrying the result. Spawning and task lifecycle
//! bookkeeping stay in the runtime.
//!
//! Transport errors are flattened with `{:#}` so the cause chain survives
//! into the transcript.

use std::sync::Arc;
use std::time::Duration;

use confab_core::api::ApiClient;

use crate::events::{ChatUiEvent, LogsUiEvent, SessionUiEvent, UiEvent};

/// Delay before the probe auto-submits its canned message.
const PROBE_DELAY: Duration = Duration::from_secs(1);

/// GET `/` and wrap the document.
pub async fn load_page(client: Arc<ApiClient>) -> UiEvent {
    match client.fetch_page().await {
        Ok(page) => UiEvent::Session(SessionUiEvent::PageLoaded { page }),
        Err(e) => UiEvent::Session(SessionUiEvent::PageLoadFailed {
            error: format!("{e:#}"),
        }),
    }
}

/// POST `/switch_session`, then re-fetch the canonical page.
pub async fn switch_then_fetch(client: Arc<ApiClient>, session_id: String) -> UiEvent {
    if let Err(e) = client.switch_session(&session_id).await {
        return UiEvent::Session(SessionUiEvent::PageLoadFailed {
            error: format!("{e:#}"),
        });
    }
    load_page(client).await
}

/// POST `/new_session`, then re-fetch the canonical page.
pub async fn create_then_fetch(client: Arc<ApiClient>, temp_session_id: String) -> UiEvent {
    if let Err(e) = client.new_session(&temp_session_id).await {
        return UiEvent::Session(SessionUiEvent::PageLoadFailed {
            error: format!("{e:#}"),
        });
    }
    load_page(client).await
}

/// POST `/continue_from_history`, then re-fetch the canonical page.
pub async fn continue_then_fetch(client: Arc<ApiClient>, history_index: usize) -> UiEvent {
    if let Err(e) = client.continue_from_history(history_index).await {
        return UiEvent::Chat(ChatUiEvent::ContinueFailed {
            error: format!("{e:#}"),
        });
    }
    load_page(client).await
}

/// POST `/send_message`.
///
/// The reply body is the assistant turn even when the server reports an
/// internal error; only transport failures surface as `SendFailed`.
pub async fn send_message(client: Arc<ApiClient>, message: String) -> UiEvent {
    match client.send_message(&message).await {
        Ok(reply) => UiEvent::Chat(ChatUiEvent::ReplyReceived {
            markdown: reply.response,
        }),
        Err(e) => UiEvent::Chat(ChatUiEvent::SendFailed {
            error: format!("{e:#}"),
        }),
    }
}

/// POST `/rename_session`.
pub async fn rename_session(
    client: Arc<ApiClient>,
    old_name: String,
    new_name: String,
) -> UiEvent {
    match client.rename_session(&old_name, &new_name).await {
        Ok(reply) => UiEvent::Session(SessionUiEvent::RenameDone {
            old_name,
            entered: new_name,
            reply,
        }),
        Err(e) => UiEvent::Session(SessionUiEvent::RenameFailed {
            error: format!("{e:#}"),
        }),
    }
}

/// POST `/delete_session`.
pub async fn delete_session(client: Arc<ApiClient>, session_id: String) -> UiEvent {
    match client.delete_session(&session_id).await {
        Ok(reply) => UiEvent::Session(SessionUiEvent::DeleteDone { session_id, reply }),
        Err(e) => UiEvent::Session(SessionUiEvent::DeleteFailed {
            error: format!("{e:#}"),
        }),
    }
}

/// POST `/save_session`.
pub async fn save_session(client: Arc<ApiClient>) -> UiEvent {
    match client.save_session().await {
        Ok(reply) => UiEvent::Session(SessionUiEvent::SaveDone { reply }),
        Err(e) => UiEvent::Session(SessionUiEvent::SaveFailed {
            error: format!("{e:#}"),
        }),
    }
}

/// GET `/get_recursion_logs`, optionally after a delay.
pub async fn refresh_logs(client: Arc<ApiClient>, delay: Option<Duration>) -> UiEvent {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match client.fetch_recursion_logs().await {
        Ok(entries) => UiEvent::Logs(LogsUiEvent::Fetched { entries }),
        Err(e) => UiEvent::Logs(LogsUiEvent::FetchFailed {
            error: format!("{e:#}"),
        }),
    }
}

/// Arms the probe timer.
pub async fn probe_timer() -> UiEvent {
    tokio::time::sleep(PROBE_DELAY).await;
    UiEvent::Chat(ChatUiEvent::ProbeFire)
}
