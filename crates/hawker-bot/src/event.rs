use serde::{Deserialize, Serialize};

/// One inbound chat event, as delivered by the transport adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A slash command, `text` as typed (`/search bedok`).
    Command { chat_id: i64, from: String, text: String },
    /// Free text that is not a command.
    Text { chat_id: i64, from: String, text: String },
    /// A shared location.
    Location {
        chat_id: i64,
        from: String,
        latitude: f64,
        longitude: f64,
    },
    /// An inline-keyboard button press carrying its callback payload.
    Callback { chat_id: i64, from: String, data: String },
    /// A sticker, reduced to the emoji it represents.
    Sticker { chat_id: i64, from: String, emoji: String },
}

impl ChatEvent {
    pub fn chat_id(&self) -> i64 {
        match self {
            Self::Command { chat_id, .. }
            | Self::Text { chat_id, .. }
            | Self::Location { chat_id, .. }
            | Self::Callback { chat_id, .. }
            | Self::Sticker { chat_id, .. } => *chat_id,
        }
    }

    pub fn from_user(&self) -> &str {
        match self {
            Self::Command { from, .. }
            | Self::Text { from, .. }
            | Self::Location { from, .. }
            | Self::Callback { from, .. }
            | Self::Sticker { from, .. } => from,
        }
    }
}

/// One button of an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub callback_data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Outbound reply: rich text, an optional inline keyboard, and the
/// web-preview suppression flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Vec<Vec<Button>>>,
    pub disable_web_page_preview: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            disable_web_page_preview: true,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Vec<Vec<Button>>) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
            disable_web_page_preview: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn events_round_trip_through_tagged_json() {
        let line = r#"{"type":"command","chat_id":7,"from":"daren","text":"/search bedok"}"#;
        let event: ChatEvent = serde_json::from_str(line).expect("parse");

        assert_eq!(event.chat_id(), 7);
        assert_eq!(event.from_user(), "daren");
        assert!(matches!(event, ChatEvent::Command { ref text, .. } if text == "/search bedok"));
    }

    #[test]
    fn location_event_carries_coordinates() {
        let line =
            r#"{"type":"location","chat_id":7,"from":"daren","latitude":1.3,"longitude":103.8}"#;
        let event: ChatEvent = serde_json::from_str(line).expect("parse");

        assert!(matches!(
            event,
            ChatEvent::Location { latitude, longitude, .. }
                if latitude == 1.3 && longitude == 103.8
        ));
    }

    #[test]
    fn plain_reply_omits_the_keyboard_field() {
        let reply = Reply::text("hello");
        let json = serde_json::to_value(&reply).expect("serialize");

        assert_eq!(json["text"], "hello");
        assert!(json.get("keyboard").is_none());
        assert_eq!(json["disable_web_page_preview"], true);
    }

    #[test]
    fn keyboard_reply_keeps_button_rows_in_order() {
        let reply = Reply::with_keyboard(
            "pick one",
            vec![vec![Button::new("A", "a")], vec![Button::new("B", "b")]],
        );
        let json = serde_json::to_value(&reply).expect("serialize");

        assert_eq!(json["keyboard"][0][0]["label"], "A");
        assert_eq!(json["keyboard"][1][0]["callback_data"], "b");
    }
}
