use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// Where a response to a [`Message`] is routed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Protocol-level line; a response goes back as a raw server line.
    Server,
    /// Message posted in a channel; a response goes back to that channel.
    #[default]
    Channel,
    /// Direct message; a response goes back to the author.
    Private,
}

/// One inbound chat event, threaded through decode, interpret and emit.
///
/// Created by the transport's decode stage, filled in by the interpreter
/// (`response`, `send_to_server`) and consumed by the emit stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_type: MessageType,
    /// Platform the message arrived on (e.g. "twitch").
    pub platform: String,
    pub author: String,
    /// Channel name without the leading `#`. Empty for private messages.
    pub channel: String,
    pub timestamp: DateTime<Utc>,
    /// Command keyword without the prefix (`hello` for `!hello`).
    pub command: String,
    /// Original message text as typed by the author.
    pub text: String,
    /// User addressed by the command, as typed (may carry a leading `@`).
    pub to_user: Option<String>,
    /// Accumulated output to send back.
    pub response: String,
    /// Whether `response` should be emitted at all.
    pub send_to_server: bool,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            message_type: MessageType::default(),
            platform: String::new(),
            author: String::new(),
            channel: String::new(),
            timestamp: Utc::now(),
            command: String::new(),
            text: String::new(),
            to_user: None,
            response: String::new(),
            send_to_server: false,
        }
    }
}

impl Message {
    /// A server-directed message carrying a raw protocol line.
    pub fn server(platform: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Server,
            platform: platform.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Fill `command` and `to_user` from `text` when it starts with
    /// `prefix`: `!So @Bob thanks` gives command `so` and target `@Bob`.
    /// Text without the prefix leaves both untouched.
    pub fn parse_command(&mut self, prefix: char) {
        let Some(invocation) = self.text.strip_prefix(prefix) else {
            return;
        };
        let mut words = invocation.split_whitespace();
        if let Some(command) = words.next() {
            self.command = command.to_lowercase();
            self.to_user = words.next().map(String::from);
        }
    }

    /// Whether the message invoked a command.
    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }

    /// The user a command acts on: `to_user` without its `@`, else the author.
    pub fn target_user(&self) -> &str {
        match self.to_user.as_deref() {
            Some(user) if !user.is_empty() => user.strip_prefix('@').unwrap_or(user),
            _ => &self.author,
        }
    }
}
