use std::{fmt, str::FromStr};

use rand::Rng;

use crate::error::Error;

/// The kinds of record the store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Command name → script.
    Commands,
    /// Variable name → value. Several values may share a name.
    Variables,
    /// Who said it → quote text. Several quotes may share a name.
    Quotes,
    /// `<platform>.<field>` → connection setting value.
    Settings,
}

impl RecordKind {
    pub const ALL: [Self; 4] = [Self::Commands, Self::Variables, Self::Quotes, Self::Settings];

    /// Stable identifier used as the `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::Variables => "variables",
            Self::Quotes => "quotes",
            Self::Settings => "settings",
        }
    }

    /// Singular label for user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Commands => "command",
            Self::Variables => "variable",
            Self::Quotes => "quote",
            Self::Settings => "setting",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "commands" | "command" => Ok(Self::Commands),
            "variables" | "variable" | "var" => Ok(Self::Variables),
            "quotes" | "quote" => Ok(Self::Quotes),
            "settings" | "setting" => Ok(Self::Settings),
            _ => Err(Error::unknown_kind(s)),
        }
    }
}

/// One stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    /// Lowercased lookup name.
    pub name: String,
    pub value: String,
    /// Who wrote the record (variable author, quote recorder).
    pub added_by: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
}

impl Record {
    pub fn new(
        kind: RecordKind,
        name: &str,
        value: impl Into<String>,
        added_by: Option<&str>,
    ) -> Self {
        Self {
            kind,
            name: normalize_name(name),
            value: value.into(),
            added_by: added_by.map(String::from),
            created_at: now_secs(),
        }
    }
}

/// Record names are case-insensitive.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Pick one record uniformly at random.
///
/// A single candidate is returned without touching the RNG.
pub fn select_random<T>(items: &[T]) -> Option<&T> {
    match items.len() {
        0 => None,
        1 => items.first(),
        n => items.get(rand::rng().random_range(0..n)),
    }
}

pub(crate) fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("var", RecordKind::Variables)]
    #[case("variables", RecordKind::Variables)]
    #[case("Command", RecordKind::Commands)]
    #[case("quotes", RecordKind::Quotes)]
    #[case("settings", RecordKind::Settings)]
    fn parses_kind(#[case] raw: &str, #[case] expected: RecordKind) {
        assert_eq!(raw.parse::<RecordKind>().unwrap(), expected);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = "emotes".parse::<RecordKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownKind { .. }));
    }

    #[test]
    fn kind_round_trips_through_column_name() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
    }

    #[test]
    fn new_record_normalizes_name() {
        let record = Record::new(RecordKind::Variables, " Greeting ", "hi", Some("jazzyeagle"));
        assert_eq!(record.name, "greeting");
        assert_eq!(record.added_by.as_deref(), Some("jazzyeagle"));
    }

    #[test]
    fn select_random_empty_and_single() {
        let empty: [u8; 0] = [];
        assert!(select_random(&empty).is_none());
        for _ in 0..20 {
            assert_eq!(select_random(&["only"]), Some(&"only"));
        }
    }

    #[test]
    fn select_random_covers_every_candidate() {
        let items = ["a", "b", "c"];
        let mut counts = [0usize; 3];
        for _ in 0..600 {
            let picked = select_random(&items).unwrap();
            let idx = items.iter().position(|i| i == picked).unwrap();
            counts[idx] += 1;
        }
        // Expected 200 each; anything under 100 means the draw is skewed.
        for count in counts {
            assert!(count > 100, "skewed selection: {counts:?}");
        }
    }
}
