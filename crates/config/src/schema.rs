//! Config schema types.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Deserializer},
    tracing::debug,
};

/// Default Twitch IRC endpoint (TLS).
pub const TWITCH_IRC_HOST: &str = "irc.chat.twitch.tv";
pub const TWITCH_IRC_TLS_PORT: u16 = 6697;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToobyConfig {
    pub store: StoreConfig,
    pub interpreter: InterpreterConfig,
    /// Twitch connection settings. When absent, the bot reads them from the
    /// store's connection-settings records instead.
    pub twitch: Option<TwitchAccountConfig>,
}

/// Record store location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// sqlx connection URL, e.g. `sqlite://tooby.db?mode=rwc` or `sqlite::memory:`.
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://tooby.db?mode=rwc".into(),
        }
    }
}

/// Script interpreter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Character that marks a chat line as a command (`!hello`).
    pub command_prefix: char,
    /// Upper bound on resolving one command script. `None` waits forever.
    pub resolve_timeout_secs: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            command_prefix: '!',
            resolve_timeout_secs: Some(10),
        }
    }
}

/// Connection settings for one Twitch bot account.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TwitchAccountConfig {
    /// Bot login name used for `NICK`.
    pub botnick: String,

    /// OAuth token used for `PASS` (`oauth:...`).
    #[serde(alias = "oauth-token")]
    pub oauth_token: Secret<String>,

    /// Channels to join on connect, without `#`. Accepts a list or a
    /// comma-separated string.
    #[serde(deserialize_with = "channel_list")]
    pub channels: Vec<String>,

    pub server: String,
    pub port: u16,
    pub tls: bool,

    /// Line posted to every channel right after joining.
    pub greeting: Option<String>,
}

impl std::fmt::Debug for TwitchAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchAccountConfig")
            .field("botnick", &self.botnick)
            .field("oauth_token", &"[REDACTED]")
            .field("channels", &self.channels)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

impl Default for TwitchAccountConfig {
    fn default() -> Self {
        Self {
            botnick: String::new(),
            oauth_token: Secret::new(String::new()),
            channels: Vec::new(),
            server: TWITCH_IRC_HOST.into(),
            port: TWITCH_IRC_TLS_PORT,
            tls: true,
            greeting: None,
        }
    }
}

impl TwitchAccountConfig {
    /// Build a config from `(field, value)` connection-setting rows.
    ///
    /// Recognized fields: `botnick`, `oauth-token`, `channels`
    /// (comma-separated), `channel` (one per row), `server`, `port`, `tls`,
    /// `greeting`. Anything else is ignored.
    pub fn from_settings<I, F, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (F, V)>,
        F: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Self::default();
        for (field, value) in rows {
            let value = value.as_ref().trim();
            match field.as_ref() {
                "botnick" => cfg.botnick = value.to_string(),
                "oauth-token" | "oauth_token" => cfg.oauth_token = Secret::new(value.to_string()),
                "channels" | "channel" => cfg.channels.extend(split_channels(value)),
                "server" => cfg.server = value.to_string(),
                "port" => match value.parse() {
                    Ok(port) => cfg.port = port,
                    Err(_) => debug!(value, "ignoring non-numeric port setting"),
                },
                "tls" => cfg.tls = matches!(value, "true" | "1" | "yes"),
                "greeting" => cfg.greeting = Some(value.to_string()),
                other => debug!(field = other, "ignoring unknown connection setting"),
            }
        }
        cfg
    }

    /// Whether a token has been provided at all.
    pub fn has_token(&self) -> bool {
        !self.oauth_token.expose_secret().is_empty()
    }
}

/// Normalize a comma-separated channel list: trim, drop `#`, lowercase.
pub fn split_channels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().trim_start_matches('#').to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn channel_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Channels {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Channels::deserialize(deserializer)? {
        Channels::List(list) => list.iter().flat_map(|c| split_channels(c)).collect(),
        Channels::Joined(raw) => split_channels(&raw),
    })
}
