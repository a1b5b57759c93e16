//! Configuration validation.
//!
//! Checks Twitch credentials and names against the platform's rules before a
//! connection is attempted, and flags settings that will make the bot useless
//! (no channels, zero timeout).

use secrecy::ExposeSecret;

use crate::schema::{ToobyConfig, TwitchAccountConfig};

/// Twitch limits channel names and logins to 25 characters.
const MAX_TWITCH_NAME_LEN: usize = 25;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "twitch.botnick"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the whole configuration.
pub fn validate(config: &ToobyConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.store.database_url.trim().is_empty() {
        result.push(Severity::Error, "store.database_url", "must not be empty");
    }
    if config.interpreter.resolve_timeout_secs == Some(0) {
        result.push(
            Severity::Warning,
            "interpreter.resolve_timeout_secs",
            "0 makes every command time out",
        );
    }
    if config.interpreter.command_prefix.is_whitespace() {
        result.push(
            Severity::Error,
            "interpreter.command_prefix",
            "must not be whitespace",
        );
    }
    if let Some(twitch) = &config.twitch {
        result
            .diagnostics
            .extend(validate_twitch(twitch, "twitch").diagnostics);
    }

    result
}

/// Validate one Twitch account's connection settings.
pub fn validate_twitch(config: &TwitchAccountConfig, prefix: &str) -> ValidationResult {
    let mut result = ValidationResult::default();

    if let Err(message) = check_oauth_token(config.oauth_token.expose_secret()) {
        result.push(Severity::Error, format!("{prefix}.oauth_token"), message);
    }
    if let Err(message) = check_twitch_name(&config.botnick) {
        result.push(Severity::Error, format!("{prefix}.botnick"), message);
    }
    if config.channels.is_empty() {
        result.push(
            Severity::Warning,
            format!("{prefix}.channels"),
            "no channels configured; the bot will only see private messages",
        );
    }
    for (i, channel) in config.channels.iter().enumerate() {
        if let Err(message) = check_twitch_name(channel) {
            result.push(Severity::Error, format!("{prefix}.channels[{i}]"), message);
        }
    }
    if config.server.trim().is_empty() {
        result.push(Severity::Error, format!("{prefix}.server"), "must not be empty");
    }

    result
}

/// `oauth:` followed by one or more ASCII alphanumerics.
fn check_oauth_token(token: &str) -> Result<(), String> {
    let Some(suffix) = token.strip_prefix("oauth:") else {
        return Err("token must start with 'oauth:'".into());
    };
    if suffix.is_empty() {
        return Err("token is empty after 'oauth:'".into());
    }
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("token contains non-alphanumeric characters".into());
    }
    Ok(())
}

/// 1-25 characters, ASCII alphanumerics and underscore.
fn check_twitch_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".into());
    }
    if name.len() > MAX_TWITCH_NAME_LEN {
        return Err(format!(
            "exceeds {MAX_TWITCH_NAME_LEN} characters (got {})",
            name.len()
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid characters in {name:?}"));
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, secrecy::Secret};

    fn account() -> TwitchAccountConfig {
        TwitchAccountConfig {
            botnick: "tooby_bot".into(),
            oauth_token: Secret::new("oauth:abc123def456".into()),
            channels: vec!["jazzyeagle".into()],
            ..Default::default()
        }
    }

    #[test]
    fn valid_account_has_no_diagnostics() {
        assert!(validate_twitch(&account(), "twitch").diagnostics.is_empty());
    }

    #[rstest]
    #[case("oauth:abc123", true)]
    #[case("oauth:ABCDEF0123456789abcdef", true)]
    #[case("abc123", false)]
    #[case("", false)]
    #[case("oauth:", false)]
    #[case("oauth:abc def", false)]
    #[case("oauth:abc\ndef", false)]
    fn oauth_token_rules(#[case] token: &str, #[case] ok: bool) {
        assert_eq!(check_oauth_token(token).is_ok(), ok);
    }

    #[rstest]
    #[case("my_channel", true)]
    #[case("aaaaaaaaaaaaaaaaaaaaaaaaa", true)]
    #[case("aaaaaaaaaaaaaaaaaaaaaaaaaa", false)]
    #[case("bad name", false)]
    #[case("bot@name", false)]
    #[case("", false)]
    fn twitch_name_rules(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(check_twitch_name(name).is_ok(), ok);
    }

    #[test]
    fn bad_channel_is_reported_with_index() {
        let mut cfg = account();
        cfg.channels.push("not valid".into());
        let result = validate_twitch(&cfg, "twitch");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].path, "twitch.channels[1]");
    }

    #[test]
    fn missing_channels_is_only_a_warning() {
        let mut cfg = account();
        cfg.channels.clear();
        let result = validate_twitch(&cfg, "twitch");
        assert!(!result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn validate_checks_nested_twitch_section() {
        let mut cfg = ToobyConfig::default();
        cfg.twitch = Some(TwitchAccountConfig::default());
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "twitch.oauth_token")
        );
    }

    #[test]
    fn zero_timeout_warns() {
        let mut cfg = ToobyConfig::default();
        cfg.interpreter.resolve_timeout_secs = Some(0);
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
    }
}
