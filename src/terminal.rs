//! Terminal transcript view
//!
//! Line-oriented stand-in for the chat window: each display event becomes a
//! line on the writer (stdout in the binary).

use crate::conversation::{Role, Turn};
use crate::display::ChatView;
use std::io::Write;

/// Transcript label for the user
pub const USER_LABEL: &str = "You";

/// Transcript label for the model
pub const MODEL_LABEL: &str = "Gemini";

/// [`ChatView`] that prints the transcript to a writer
pub struct TerminalView<W: Write> {
    out: W,
    input_enabled: bool,
}

impl<W: Write> TerminalView<W> {
    /// Create a view writing to `out`; input starts enabled
    pub fn new(out: W) -> Self {
        Self {
            out,
            input_enabled: true,
        }
    }

    /// Whether the user may currently submit
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Consume the view and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write transcript line");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn show_turn(&mut self, turn: &Turn) {
        let label = match turn.role() {
            Role::User => USER_LABEL,
            Role::Model => MODEL_LABEL,
        };
        self.write_line(&format!("{}: {}", label, turn.text()));
    }

    fn show_error(&mut self, message: &str) {
        self.write_line(message);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled && !self.input_enabled {
            self.write_line("");
        }
        self.input_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayEvent, DisplayQueue};

    #[test]
    fn test_transcript_lines() {
        let queue = DisplayQueue::new();
        queue.push(DisplayEvent::Turn(Turn::user("Hi")));
        queue.push(DisplayEvent::InputEnabled(false));
        queue.push(DisplayEvent::Turn(Turn::model("Hello")));
        queue.push(DisplayEvent::InputEnabled(true));

        let mut view = TerminalView::new(Vec::new());
        queue.pump(&mut view);

        assert!(view.input_enabled());
        let output = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(output, "You: Hi\nGemini: Hello\n\n");
    }

    #[test]
    fn test_error_line_and_disabled_input() {
        let mut view = TerminalView::new(Vec::new());
        view.set_input_enabled(false);
        view.show_error("Error: something broke");

        assert!(!view.input_enabled());
        let output = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(output, "Error: something broke\n");
    }
}
