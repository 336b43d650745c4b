// Normalized host message event, validated when it is built.

use serde_json::Value;

use crate::error::{LookupError, Result};

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Group(i64),
    Private(i64),
}

/// A OneBot-style message event reduced to what the plugin needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    self_id: String,
    session: Session,
    message: String,
}

impl MessageEvent {
    pub fn new(self_id: impl Into<String>, session: Session, message: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            session,
            message: message.into(),
        }
    }

    /// Build from a OneBot v11 message event. Ids may be JSON numbers or numeric
    /// strings. Group events must carry `group_id`, private ones `user_id`.
    pub fn from_onebot(event: &Value) -> Result<Self> {
        let self_id = event
            .get("self_id")
            .and_then(id_of)
            .ok_or_else(|| invalid("missing self_id"))?;

        let session = match event.get("message_type").and_then(Value::as_str) {
            Some("group") => Session::Group(
                event
                    .get("group_id")
                    .and_then(id_of)
                    .ok_or_else(|| invalid("group message without a numeric group_id"))?,
            ),
            Some("private") => Session::Private(
                event
                    .get("user_id")
                    .and_then(id_of)
                    .ok_or_else(|| invalid("private message without a numeric user_id"))?,
            ),
            Some(other) => return Err(invalid(&format!("unsupported message_type {other:?}"))),
            None => return Err(invalid("missing message_type")),
        };

        let message = event
            .get("raw_message")
            .or_else(|| event.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(Self::new(self_id.to_string(), session, message))
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Group the event was posted in, if any.
    pub fn group_id(&self) -> Option<i64> {
        match self.session {
            Session::Group(id) => Some(id),
            Session::Private(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Command argument: the text after the first token, with colons removed.
    pub fn query(&self) -> String {
        command_argument(&self.message)
    }
}

/// Text after the first whitespace-separated token, without `:`/`：`, trimmed.
pub fn command_argument(message: &str) -> String {
    let trimmed = message.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.replace(&[':', '：'][..], "").trim().to_string(),
        None => String::new(),
    }
}

fn id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid(reason: &str) -> LookupError {
    LookupError::InvalidEvent(reason.to_string())
}
