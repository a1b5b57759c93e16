//! Builtin directives and their dispatch.

use {
    crate::{
        conditional::{parse_condition, split_branches},
        engine::Interpreter,
        error::{Error, Result},
    },
    std::str::FromStr,
    tooby_common::Message,
    tooby_store::RecordKind,
    tracing::{debug, info},
};

/// Every keyword a directive may start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Var,
    Command,
    Quote,
    /// Stream link of the target user.
    Channel,
    /// `to_user` without `@`, else the author.
    User,
    /// The author, verbatim.
    Sender,
    /// Second word of the original message (`{1}`).
    FirstArg,
    If,
    Join,
    Part,
}

impl Builtin {
    /// The store namespace behind `var`, `command` and `quote`.
    pub fn record_kind(self) -> Option<RecordKind> {
        match self {
            Self::Var => Some(RecordKind::Variables),
            Self::Command => Some(RecordKind::Commands),
            Self::Quote => Some(RecordKind::Quotes),
            _ => None,
        }
    }
}

impl FromStr for Builtin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "var" => Self::Var,
            "command" => Self::Command,
            "quote" => Self::Quote,
            "channel" => Self::Channel,
            "user" => Self::User,
            "sender" => Self::Sender,
            "1" => Self::FirstArg,
            "if" => Self::If,
            "join" => Self::Join,
            "part" => Self::Part,
            other => return Err(Error::unknown_command(other)),
        })
    }
}

/// Operations on a record namespace. Aliases collapse onto one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCommand {
    Get,
    /// `set` or `edit`: replace every value under the name.
    Set,
    /// Append another value under the name.
    Add,
    /// `delete`, `unset` or `remove`.
    Delete,
    Exists,
}

impl SubCommand {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "get" => Some(Self::Get),
            "set" | "edit" => Some(Self::Set),
            "add" => Some(Self::Add),
            "delete" | "unset" | "remove" => Some(Self::Delete),
            "exists" => Some(Self::Exists),
            _ => None,
        }
    }
}

/// Split off the first whitespace-delimited token; the rest is trimmed.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(i) => Some((&s[..i], s[i..].trim())),
        None => Some((s, "")),
    }
}

fn channel_names(args: &str) -> Vec<String> {
    args.split_whitespace()
        .map(|c| c.trim_start_matches('#').to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

impl Interpreter {
    /// Run one directive. `directive` is the text between the braces, with
    /// every nested directive already resolved (except inside `if`).
    pub async fn dispatch(&self, directive: &str, message: &Message) -> Result<String> {
        let mut splices = 0;
        self.dispatch_nested(directive, message, 0, &mut splices).await
    }

    pub(crate) async fn dispatch_nested(
        &self,
        directive: &str,
        message: &Message,
        depth: usize,
        splices: &mut usize,
    ) -> Result<String> {
        let Some((keyword, args)) = next_token(directive) else {
            return Err(Error::unknown_command(""));
        };
        let builtin: Builtin = keyword.parse()?;
        debug!(?builtin, args, "dispatching directive");

        match builtin {
            Builtin::Var | Builtin::Command | Builtin::Quote => {
                let kind = builtin
                    .record_kind()
                    .ok_or_else(|| Error::unknown_command(keyword))?;
                self.record(kind, args, message).await
            },
            Builtin::Channel => Ok(format!("https://twitch.tv/{}", message.target_user())),
            Builtin::User => Ok(message.target_user().to_string()),
            Builtin::Sender => Ok(message.author.clone()),
            Builtin::FirstArg => message
                .text
                .split_whitespace()
                .nth(1)
                .map(String::from)
                .ok_or_else(|| Error::missing("argument after the command")),
            Builtin::If => self.conditional(args, message, depth, splices).await,
            Builtin::Join => {
                let channels = channel_names(args);
                if channels.is_empty() {
                    return Err(Error::missing("channel to join"));
                }
                let control = self.control().ok_or_else(|| Error::unsupported("join"))?;
                control.join_channels(&channels).await?;
                info!(channels = ?channels, by = %message.author, "joined channels");
                Ok(format!("Successfully joined channels {}", channels.join(" ")))
            },
            Builtin::Part => {
                let channels = channel_names(args);
                if channels.is_empty() {
                    return Err(Error::missing("channel to part"));
                }
                let control = self.control().ok_or_else(|| Error::unsupported("part"))?;
                control.part_channels(&channels).await?;
                info!(channels = ?channels, by = %message.author, "parted channels");
                Ok(format!("Successfully parted channels {}", channels.join(" ")))
            },
        }
    }

    /// `var` / `command` / `quote`.
    async fn record(&self, kind: RecordKind, args: &str, message: &Message) -> Result<String> {
        let Some((first, rest)) = next_token(args) else {
            return Err(Error::missing(format!("{kind} name")));
        };
        let (sub, name, value) = match SubCommand::parse(first) {
            Some(sub) => {
                let (name, value) =
                    next_token(rest).ok_or_else(|| Error::missing(format!("{kind} name")))?;
                (sub, name, value)
            },
            None => (SubCommand::Get, first, rest),
        };

        let store = self.store();
        let author = (!message.author.is_empty()).then_some(message.author.as_str());

        match sub {
            SubCommand::Get => Ok(store.get(kind, name).await?),
            SubCommand::Exists => Ok(if store.exists(kind, name).await? {
                "True".into()
            } else {
                "False".into()
            }),
            SubCommand::Set | SubCommand::Add => {
                if value.is_empty() {
                    return Err(Error::missing(format!("value for {kind} {name}")));
                }
                if sub == SubCommand::Set {
                    store.set(kind, name, value, author).await?;
                } else {
                    store.add(kind, name, value, author).await?;
                }

                let written = store.get_all(kind, name).await?;
                if !written.iter().any(|r| r.value == value) {
                    return Err(Error::WriteVerificationFailed {
                        kind,
                        name: name.to_string(),
                    });
                }
                info!(%kind, name, by = ?author, ?sub, "record written");
                let verb = if sub == SubCommand::Set {
                    "set"
                } else {
                    "added"
                };
                Ok(format!("{kind} {name} successfully {verb}."))
            },
            SubCommand::Delete => {
                if store.delete(kind, name).await? == 0 {
                    return Err(Error::not_found(kind, name));
                }
                info!(%kind, name, by = ?author, "record deleted");
                Ok(format!("{kind} {name} deleted."))
            },
        }
    }

    /// `if <condition>|<then>|<else>`. Only the chosen branch is resolved.
    async fn conditional(
        &self,
        args: &str,
        message: &Message,
        depth: usize,
        splices: &mut usize,
    ) -> Result<String> {
        let branches = split_branches(args)?;
        let condition = self
            .resolve_nested(branches.condition, message, depth + 1, splices)
            .await?;
        let branch = if parse_condition(&condition)? {
            branches.then
        } else {
            branches.otherwise
        };
        self.resolve_nested(branch, message, depth + 1, splices)
            .await
    }
}
