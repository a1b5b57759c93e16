use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::ToobyConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["tooby.toml", "tooby.yaml", "tooby.yml", "tooby.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<ToobyConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tooby.{toml,yaml,yml,json}`
/// 2. `~/.config/tooby/tooby.{toml,yaml,yml,json}`
///
/// Falls back to `ToobyConfig::default()` when nothing is found or the file
/// fails to parse.
pub fn discover_and_load() -> ToobyConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    ToobyConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

/// Returns the user-global config directory (`~/.config/tooby/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tooby").map(|d| d.config_dir().to_path_buf())
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> Result<ToobyConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, secrecy::ExposeSecret};

    #[rstest]
    #[case(
        "tooby.toml",
        "[twitch]\nbotnick = \"toobybot\"\nchannels = \"jazzyeagle\"\n"
    )]
    #[case(
        "tooby.yaml",
        "twitch:\n  botnick: toobybot\n  channels: [jazzyeagle]\n"
    )]
    #[case(
        "tooby.json",
        r#"{"twitch": {"botnick": "toobybot", "channels": ["jazzyeagle"]}}"#
    )]
    fn loads_every_format(#[case] name: &str, #[case] body: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();

        let cfg = load_config(&path).unwrap();
        let twitch = cfg.twitch.unwrap();
        assert_eq!(twitch.botnick, "toobybot");
        assert_eq!(twitch.channels, vec!["jazzyeagle"]);
    }

    #[test]
    fn substitutes_env_fallback_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tooby.toml");
        std::fs::write(
            &path,
            "[twitch]\noauth_token = \"${TOOBY_UNSET_TOKEN_FOR_TEST:-oauth:fallback}\"\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(
            cfg.twitch.unwrap().oauth_token.expose_secret(),
            "oauth:fallback"
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tooby.ini");
        std::fs::write(&path, "botnick=x").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/tooby.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tooby.toml"));
    }

    #[test]
    fn find_in_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tooby.json"), "{}").unwrap();
        std::fs::write(dir.path().join("tooby.toml"), "").unwrap();
        let found = find_in(dir.path()).unwrap();
        assert!(found.ends_with("tooby.toml"));
    }
}
