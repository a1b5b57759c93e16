//! IRC line codec for Twitch chat.
//!
//! Inbound: `PING` keep-alives and `PRIVMSG` chat lines, optionally carrying
//! an IRCv3 tag prefix. Everything else decodes to a server message that is
//! never answered.
//!
//! Outbound: builders for every line the bot sends. CR and LF inside a payload
//! are replaced with spaces so a response can never smuggle in a second
//! command.

use {
    chrono::{DateTime, Utc},
    tooby_common::{Message, MessageType},
};

use crate::PLATFORM;

/// One decoded inbound line, as it travels through the pipeline.
#[derive(Debug, Clone)]
pub enum Frame {
    /// `PING :<payload>`; answered with `PONG :<payload>`.
    KeepAlive(String),
    Chat(Message),
}

/// Decode one line (without its `\r\n`).
pub fn parse_line(line: &str, command_prefix: char) -> Frame {
    let (tags, line) = split_tags(line);

    if let Some(payload) = parse_ping(line) {
        return Frame::KeepAlive(payload.to_string());
    }

    match parse_privmsg(line, command_prefix) {
        Some(mut message) => {
            if let Some(sent) = tags.and_then(sent_timestamp) {
                message.timestamp = sent;
            }
            Frame::Chat(message)
        },
        None => Frame::Chat(Message::server(PLATFORM, line)),
    }
}

/// Split an `@key=value;... ` tag block off the front of a line.
fn split_tags(line: &str) -> (Option<&str>, &str) {
    match line.strip_prefix('@').and_then(|rest| rest.split_once(' ')) {
        Some((tags, rest)) => (Some(tags), rest.trim_start()),
        None => (None, line),
    }
}

/// `tmi-sent-ts` carries the server's receive time in Unix milliseconds.
fn sent_timestamp(tags: &str) -> Option<DateTime<Utc>> {
    tags.split(';')
        .find_map(|tag| tag.strip_prefix("tmi-sent-ts="))
        .and_then(|ms| ms.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

fn parse_ping(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("PING")?;
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    Some(rest.trim().trim_start_matches(':'))
}

/// `:<author>!<user>@<host> PRIVMSG <target> :<text>`
fn parse_privmsg(line: &str, command_prefix: char) -> Option<Message> {
    let (source, rest) = line.strip_prefix(':')?.split_once(' ')?;
    let author = source.split('!').next()?;
    let (target, text) = rest.strip_prefix("PRIVMSG ")?.split_once(" :")?;
    if author.is_empty() {
        return None;
    }

    let (message_type, channel) = match target.trim().strip_prefix('#') {
        Some(channel) => (MessageType::Channel, channel.to_lowercase()),
        None => (MessageType::Private, String::new()),
    };

    let mut message = Message {
        message_type,
        platform: PLATFORM.to_string(),
        author: author.to_string(),
        channel,
        text: text.to_string(),
        ..Default::default()
    };

    message.parse_command(command_prefix);
    Some(message)
}

fn clean(payload: &str) -> String {
    payload.replace(['\r', '\n'], " ")
}

fn channel_target(channel: &str) -> String {
    format!("#{}", clean(channel.trim_start_matches('#')).to_lowercase())
}

pub fn pass(token: &str) -> String {
    format!("PASS {}", clean(token))
}

pub fn nick(name: &str) -> String {
    format!("NICK {}", clean(name))
}

pub fn join(channel: &str) -> String {
    format!("JOIN {}", channel_target(channel))
}

pub fn part(channel: &str) -> String {
    format!("PART {}", channel_target(channel))
}

pub fn pong(payload: &str) -> String {
    format!("PONG :{}", clean(payload))
}

pub fn privmsg_channel(channel: &str, text: &str) -> String {
    format!("PRIVMSG {} :{}", channel_target(channel), clean(text))
}

pub fn privmsg_user(user: &str, text: &str) -> String {
    format!("PRIVMSG {} :{}", clean(user), clean(text))
}

/// The line that answers `message`, if it has anything to say.
pub fn response_line(message: &Message) -> Option<String> {
    if !message.send_to_server || message.response.trim().is_empty() {
        return None;
    }
    Some(match message.message_type {
        MessageType::Server => clean(&message.response),
        MessageType::Channel => privmsg_channel(&message.channel, &message.response),
        MessageType::Private => privmsg_user(&message.author, &message.response),
    })
}
