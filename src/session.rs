//! Request/response cycle
//!
//! [`ChatSession`] turns one user submission into one model reply. All
//! mutable chat state (history, busy flag, in-flight exchange) lives in a
//! single [`SessionState`] behind a mutex; results reach the UI only through
//! the [`DisplayQueue`].
//!
//! At most one exchange is in flight at a time. A failed exchange is not
//! retried, but its user turn stays in history and is resent with the next
//! submission.

use crate::conversation::{Conversation, Turn};
use crate::display::{DisplayEvent, DisplayQueue};
use crate::error::ChatError;
use crate::gemini::ContentGenerator;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Transcript entry shown for every failed exchange, whatever the cause
pub const ERROR_MESSAGE: &str = "Error: could not get a reply from Gemini. Please try again.";

/// Unique identifier of one exchange
pub type ExchangeId = Uuid;

/// Why a submission was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty or whitespace only
    EmptyInput,
    /// Another exchange is still in flight
    Busy,
    /// The session has been shut down
    ShutDown,
}

/// Result of [`ChatSession::submit`]
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The exchange is running; the handle resolves to the model turn or the error
    Started {
        /// Identifier of the new exchange
        exchange_id: ExchangeId,
        /// Completion handle of the exchange task
        handle: JoinHandle<Result<Turn, ChatError>>,
    },
    /// Nothing happened
    Rejected(RejectReason),
}

impl SubmitOutcome {
    /// Whether the submission started an exchange
    pub fn is_started(&self) -> bool {
        matches!(self, SubmitOutcome::Started { .. })
    }
}

/// The in-flight network call for one user turn
#[derive(Debug)]
pub struct PendingExchange {
    /// Identifier of the exchange
    pub id: ExchangeId,
    /// Cancels the network call
    pub cancel: CancellationToken,
}

/// Everything an exchange reads or writes
#[derive(Debug, Default)]
pub struct SessionState {
    /// Conversation history
    pub conversation: Conversation,
    /// Set while an exchange is in flight
    pub busy: bool,
    /// The exchange currently in flight, if any
    pub pending: Option<PendingExchange>,
}

type SharedState = Arc<Mutex<SessionState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single-flight chat session
pub struct ChatSession {
    state: SharedState,
    generator: Arc<dyn ContentGenerator>,
    display: DisplayQueue,
    runtime: Handle,
    shutdown: CancellationToken,
}

impl ChatSession {
    /// Create a session
    ///
    /// # Arguments
    /// * `generator` - Produces replies; shared by every exchange
    /// * `display` - Queue the UI thread drains
    /// * `runtime` - Runtime the exchange tasks are spawned on, so `submit`
    ///   can be called from a thread that is not part of it
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        display: DisplayQueue,
        runtime: Handle,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            generator,
            display,
            runtime,
            shutdown: CancellationToken::new(),
        }
    }

    /// Queue this session writes display events to
    pub fn display(&self) -> &DisplayQueue {
        &self.display
    }

    /// Submit user text
    ///
    /// Empty or whitespace input, and input arriving while another exchange
    /// is in flight, are rejected without any effect. Otherwise the user turn
    /// is recorded and queued for display, input is disabled, and one
    /// request carrying the full history is spawned.
    pub fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }

        let (exchange_id, cancel, snapshot) = {
            let mut state = lock(&self.state);
            if self.shutdown.is_cancelled() {
                return SubmitOutcome::Rejected(RejectReason::ShutDown);
            }
            if state.busy {
                debug!("Submission ignored, exchange already in flight");
                return SubmitOutcome::Rejected(RejectReason::Busy);
            }

            let exchange_id = Uuid::new_v4();
            let cancel = self.shutdown.child_token();
            let turn = Turn::user(text);

            state.busy = true;
            state.pending = Some(PendingExchange {
                id: exchange_id,
                cancel: cancel.clone(),
            });
            state.conversation.append(turn.clone());

            self.display.push(DisplayEvent::Turn(turn));
            self.display.push(DisplayEvent::InputEnabled(false));

            (exchange_id, cancel, state.conversation.snapshot())
        };

        let span = info_span!("exchange", exchange_id = %exchange_id, turns = snapshot.len());
        let handle = self.runtime.spawn(
            run_exchange(
                exchange_id,
                snapshot,
                cancel,
                Arc::clone(&self.state),
                Arc::clone(&self.generator),
                self.display.clone(),
            )
            .instrument(span),
        );

        SubmitOutcome::Started {
            exchange_id,
            handle,
        }
    }

    /// Whether an exchange is in flight
    pub fn is_busy(&self) -> bool {
        lock(&self.state).busy
    }

    /// Identifier of the in-flight exchange, if any
    pub fn pending_exchange(&self) -> Option<ExchangeId> {
        lock(&self.state).pending.as_ref().map(|p| p.id)
    }

    /// Copy of the conversation history
    pub fn history(&self) -> Vec<Turn> {
        lock(&self.state).conversation.snapshot()
    }

    /// Cancel any in-flight exchange and refuse further submissions
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Chat session shutting down");
            self.shutdown.cancel();
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Releases the single-flight lock however the exchange ends
///
/// Created before the network call so that a panicking generator or an
/// aborted task still clears `busy`, clears `pending` and re-enables input.
struct ExchangeGuard {
    exchange_id: ExchangeId,
    state: SharedState,
    display: DisplayQueue,
    settled: bool,
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if !self.settled {
            warn!(exchange_id = %self.exchange_id, "Exchange ended without an outcome");
            self.display
                .push(DisplayEvent::Error(ERROR_MESSAGE.to_string()));
        }
        if state.pending.as_ref().map(|p| p.id) == Some(self.exchange_id) {
            state.pending = None;
        }
        state.busy = false;
        self.display.push(DisplayEvent::InputEnabled(true));
    }
}

async fn run_exchange(
    exchange_id: ExchangeId,
    snapshot: Vec<Turn>,
    cancel: CancellationToken,
    state: SharedState,
    generator: Arc<dyn ContentGenerator>,
    display: DisplayQueue,
) -> Result<Turn, ChatError> {
    let mut guard = ExchangeGuard {
        exchange_id,
        state,
        display,
        settled: false,
    };

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ChatError::Cancelled),
        reply = generator.generate(&snapshot) => reply,
    };

    let outcome = match result {
        Ok(text) => {
            let turn = Turn::model(text);
            lock(&guard.state).conversation.append(turn.clone());
            guard.display.push(DisplayEvent::Turn(turn.clone()));
            info!(reply_len = turn.text().len(), "Exchange completed");
            Ok(turn)
        }
        Err(ChatError::Cancelled) => {
            debug!("Exchange cancelled");
            guard
                .display
                .push(DisplayEvent::Error(ERROR_MESSAGE.to_string()));
            Err(ChatError::Cancelled)
        }
        Err(e) => {
            warn!(category = e.category(), error = %e, "Exchange failed");
            guard
                .display
                .push(DisplayEvent::Error(ERROR_MESSAGE.to_string()));
            Err(e)
        }
    };

    guard.settled = true;
    outcome
}
