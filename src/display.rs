//! Display synchronization
//!
//! Exchanges finish on a runtime worker, but the transcript belongs to the
//! UI thread. Results are pushed onto a mutex-guarded FIFO queue and applied
//! to the view by [`DisplayQueue::pump`], which the UI thread calls on a
//! fixed cadence (once per frame).
//!
//! Constraint: `pump` must only be called from the thread that owns the view.
//! `push` may be called from anywhere.

use crate::conversation::Turn;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One buffered instruction for the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Append a turn to the transcript
    Turn(Turn),
    /// Append an error entry to the transcript
    Error(String),
    /// Enable or disable the text input and submit control
    InputEnabled(bool),
}

/// The UI surface the chat writes to
pub trait ChatView {
    /// Append a turn to the transcript
    fn show_turn(&mut self, turn: &Turn);

    /// Append an error entry to the transcript
    fn show_error(&mut self, message: &str);

    /// Enable or disable input
    fn set_input_enabled(&mut self, enabled: bool);
}

/// Cloneable handle to the shared display queue
#[derive(Debug, Clone, Default)]
pub struct DisplayQueue {
    events: Arc<Mutex<VecDeque<DisplayEvent>>>,
}

impl DisplayQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    // No critical section can leave the deque half-updated; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<DisplayEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Buffer an event for the next drain
    pub fn push(&self, event: DisplayEvent) {
        self.lock().push_back(event);
    }

    /// Take every buffered event, oldest first
    pub fn drain(&self) -> Vec<DisplayEvent> {
        self.lock().drain(..).collect()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drain the queue into `view`, returning how many events were applied
    ///
    /// The lock is released before the view is touched, so a slow view never
    /// blocks an exchange that is trying to push.
    pub fn pump(&self, view: &mut dyn ChatView) -> usize {
        let events = self.drain();
        for event in &events {
            match event {
                DisplayEvent::Turn(turn) => view.show_turn(turn),
                DisplayEvent::Error(message) => view.show_error(message),
                DisplayEvent::InputEnabled(enabled) => view.set_input_enabled(*enabled),
            }
        }
        events.len()
    }
}
