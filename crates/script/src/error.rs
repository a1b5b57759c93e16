use tooby_store::RecordKind;

/// Everything that can abort the resolution of a script.
///
/// The `Display` text is what users see after `Error: ` in chat, so keep it
/// short and free of internals.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unbalanced brackets")]
    UnbalancedBrackets,

    #[error("directives nested deeper than {max} levels")]
    DepthExceeded { max: usize },

    #[error("unknown command '{keyword}'")]
    UnknownCommand { keyword: String },

    #[error("missing {what}")]
    MissingArgument { what: String },

    #[error("if needs exactly 3 '|'-separated parts, found {segments}")]
    MalformedConditional { segments: usize },

    #[error("condition must be True or False, got '{value}'")]
    NonBooleanCondition { value: String },

    #[error("{kind} {name} not found")]
    NotFound { kind: RecordKind, name: String },

    #[error("{kind} {name} could not be verified after writing")]
    WriteVerificationFailed { kind: RecordKind, name: String },

    #[error("{what} is not supported here")]
    Unsupported { what: String },

    #[error("more than {limit} substitutions")]
    TooManySubstitutions { limit: usize },

    #[error("store error: {0}")]
    Store(#[source] tooby_store::Error),

    #[error(transparent)]
    Channel(#[from] tooby_channels::Error),
}

impl Error {
    #[must_use]
    pub fn unknown_command(keyword: impl Into<String>) -> Self {
        Self::UnknownCommand {
            keyword: keyword.into(),
        }
    }

    #[must_use]
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingArgument { what: what.into() }
    }

    #[must_use]
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported { what: what.into() }
    }

    #[must_use]
    pub fn not_found(kind: RecordKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<tooby_store::Error> for Error {
    fn from(err: tooby_store::Error) -> Self {
        match err {
            tooby_store::Error::NotFound { kind, name } => Self::NotFound { kind, name },
            other => Self::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
