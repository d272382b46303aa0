//! Background worker that runs API calls off the UI thread.
//!
//! The UI sends [`ApiCommand`]s and polls [`ApiMessage`]s once per frame. The
//! worker owns a Tokio runtime on its own thread and calls `notify` after
//! every message so the UI can repaint.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::api::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::model::{Block, Event};

/// Commands sent from the UI to the API worker
#[derive(Debug, Clone)]
pub enum ApiCommand {
    /// Mail a login code
    SendCode(String),
    /// Exchange a login code for tokens
    VerifyCode { email: String, code: String },
    /// Forget stored tokens
    Logout,
    /// Reload current and all events
    RefreshAll,
    FetchEvent(i64),
    FetchBlock(i64),
    /// Stop the worker
    Shutdown,
}

/// Messages sent from the API worker to the UI
#[derive(Debug, Clone)]
pub enum ApiMessage {
    CodeSent,
    CodeRejected(String),
    LoggedIn,
    LoginFailed(String),
    LoggedOut,
    CurrentEventsLoaded(Vec<Event>),
    AllEventsLoaded(Vec<Event>),
    /// Loading all events failed; the timeline stops waiting
    AllEventsFailed(String),
    EventLoaded(Event),
    BlockLoaded(Block),
    Error(String),
}

/// UI-side handle to a running worker.
pub struct ApiHandle {
    commands: UnboundedSender<ApiCommand>,
    messages: UnboundedReceiver<ApiMessage>,
}

impl ApiHandle {
    /// Start the worker thread. `notify` runs after every message is queued.
    pub fn spawn<F>(client: ApiClient, notify: F) -> ApiResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("api-worker".into())
            .spawn(move || {
                runtime.block_on(run_worker(client, cmd_rx, msg_tx, notify));
            })?;

        Ok(Self {
            commands: cmd_tx,
            messages: msg_rx,
        })
    }

    pub fn send(&self, command: ApiCommand) -> ApiResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ApiError::WorkerStopped)
    }

    /// Next pending message, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<ApiMessage> {
        self.messages.try_recv().ok()
    }
}

impl Drop for ApiHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(ApiCommand::Shutdown);
    }
}

async fn run_worker<F>(
    client: ApiClient,
    mut rx: UnboundedReceiver<ApiCommand>,
    tx: UnboundedSender<ApiMessage>,
    notify: F,
) where
    F: Fn() + Send + Sync + 'static,
{
    info!(base_url = client.base_url(), "api worker started");
    let emit = |message: ApiMessage| {
        if tx.send(message).is_ok() {
            notify();
        }
    };

    while let Some(command) = rx.recv().await {
        debug!(?command, "api command");
        match command {
            ApiCommand::Shutdown => break,
            ApiCommand::SendCode(email) => match client.send_code(&email).await {
                Ok(()) => emit(ApiMessage::CodeSent),
                Err(e) => {
                    error!(error = %e, "send code failed");
                    emit(ApiMessage::CodeRejected(e.to_string()));
                }
            },
            ApiCommand::VerifyCode { email, code } => {
                match client.verify_code(&email, &code).await {
                    Ok(_) => emit(ApiMessage::LoggedIn),
                    Err(e) => {
                        error!(error = %e, "verify code failed");
                        emit(ApiMessage::LoginFailed(e.to_string()));
                    }
                }
            }
            ApiCommand::Logout => {
                client.logout();
                emit(ApiMessage::LoggedOut);
            }
            ApiCommand::RefreshAll => {
                let (current, all) = tokio::join!(client.current_events(), client.all_events());
                emit(current_events_message(current));
                emit(all_events_message(all));
            }
            ApiCommand::FetchEvent(id) => match client.event(id).await {
                Ok(event) => emit(ApiMessage::EventLoaded(event)),
                Err(e) => emit(ApiMessage::Error(format!("Event {id}: {e}"))),
            },
            ApiCommand::FetchBlock(id) => match client.block(id).await {
                Ok(block) => emit(ApiMessage::BlockLoaded(block)),
                Err(e) => emit(ApiMessage::Error(format!("Block {id}: {e}"))),
            },
        }
    }
    info!("api worker stopped");
}

fn current_events_message(result: ApiResult<Vec<Event>>) -> ApiMessage {
    match result {
        Ok(events) => ApiMessage::CurrentEventsLoaded(events),
        Err(e) => {
            error!(error = %e, "loading current events failed");
            ApiMessage::Error(format!("Current events: {e}"))
        }
    }
}

fn all_events_message(result: ApiResult<Vec<Event>>) -> ApiMessage {
    match result {
        Ok(events) => ApiMessage::AllEventsLoaded(events),
        Err(e) => {
            error!(error = %e, "loading all events failed");
            ApiMessage::AllEventsFailed(e.to_string())
        }
    }
}
