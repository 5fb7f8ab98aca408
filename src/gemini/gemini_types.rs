//! Gemini API request and response types
//!
//! Structs that mirror the `generateContent` JSON format. Response fields are
//! lenient (`#[serde(default)]`) so a body without candidates still parses
//! and can be reported as "no reply" instead of a parse failure.

use crate::conversation::{Role, Turn};
use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`
#[derive(Serialize, Debug, PartialEq)]
pub struct GenerateContentRequest {
    /// Full conversation so far, oldest first
    pub contents: Vec<RequestContent>,
}

impl GenerateContentRequest {
    /// Build a request that replays every turn of the conversation
    pub fn from_turns(turns: &[Turn]) -> Self {
        Self {
            contents: turns.iter().map(RequestContent::from).collect(),
        }
    }
}

/// One turn in a request
#[derive(Serialize, Debug, PartialEq)]
pub struct RequestContent {
    /// Author of the turn
    pub role: Role,
    /// Content parts (always a single text part here)
    pub parts: Vec<RequestPart>,
}

impl From<&Turn> for RequestContent {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            parts: vec![RequestPart {
                text: turn.text().to_string(),
            }],
        }
    }
}

/// A single text part for requests
#[derive(Serialize, Debug, PartialEq)]
pub struct RequestPart {
    /// The text content
    pub text: String,
}

/// Top-level Gemini API response
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate replies; missing is the same as empty
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback about the prompt (e.g. if it was blocked)
    #[serde(default, alias = "prompt_feedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if there is one
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .and_then(|part| part.text.as_deref())
    }

    /// Reason the prompt was blocked, if the API says so
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

/// A single candidate reply
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Content of this candidate
    #[serde(default)]
    pub content: Content,
    /// Why the model stopped generating
    #[serde(default, alias = "finish_reason")]
    pub finish_reason: Option<String>,
}

/// Content of a candidate
#[derive(Deserialize, Debug, Default)]
pub struct Content {
    /// Parts of the reply (typically one text part)
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Role of the content (e.g. "model")
    #[serde(default)]
    pub role: Option<String>,
}

/// A single part of a candidate; non-text parts have no `text`
#[derive(Deserialize, Debug, Default)]
pub struct Part {
    /// The text content
    #[serde(default)]
    pub text: Option<String>,
}

/// Feedback about the prompt
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked
    #[serde(default, alias = "block_reason")]
    pub block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_replays_turns_in_order() {
        let turns = vec![
            Turn::user("Hi"),
            Turn::model("Hello! How can I help?"),
            Turn::user("Tell me a joke"),
        ];
        let request = GenerateContentRequest::from_turns(&turns);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Hi"}]},
                    {"role": "model", "parts": [{"text": "Hello! How can I help?"}]},
                    {"role": "user", "parts": [{"text": "Tell me a joke"}]}
                ]
            })
        );
    }

    #[test]
    fn test_first_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"Hello"},{"text":"ignored"}],"role":"model"},"finishReason":"STOP"},
                {"content":{"parts":[{"text":"second candidate"}]}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(response.first_text(), Some("Hello"));
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_missing_candidates_parses_as_empty() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn test_candidate_without_content() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn test_block_reason_both_casings() {
        let camel: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let snake: GenerateContentResponse =
            serde_json::from_str(r#"{"prompt_feedback":{"block_reason":"OTHER"}}"#).unwrap();

        assert_eq!(camel.block_reason(), Some("SAFETY"));
        assert_eq!(snake.block_reason(), Some("OTHER"));
    }
}
