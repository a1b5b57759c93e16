use {
    async_trait::async_trait,
    std::{
        collections::BTreeSet,
        sync::Mutex,
    },
    tooby_channels::ChannelControl,
    tracing::info,
};

use crate::{irc, writer::IrcWriter};

/// Runtime `JOIN`/`PART` on a live Twitch connection.
pub struct TwitchControl {
    writer: IrcWriter,
    joined: Mutex<BTreeSet<String>>,
}

impl TwitchControl {
    /// A handle for a connection that has already joined `channels`.
    pub fn with_joined(writer: IrcWriter, channels: &[String]) -> Self {
        Self {
            writer,
            joined: Mutex::new(channels.iter().map(|c| Self::normalize(c)).collect()),
        }
    }

    /// Channels currently joined, sorted.
    pub fn joined(&self) -> Vec<String> {
        let joined = self.joined.lock().unwrap_or_else(|e| e.into_inner());
        joined.iter().cloned().collect()
    }

    fn normalize(channel: &str) -> String {
        channel.trim_start_matches('#').to_lowercase()
    }
}

#[async_trait]
impl ChannelControl for TwitchControl {
    async fn join_channels(&self, channels: &[String]) -> tooby_channels::Result<()> {
        let lines: Vec<String> = channels.iter().map(|c| irc::join(c)).collect();
        self.writer.send_all(&lines).await?;

        let mut joined = self.joined.lock().unwrap_or_else(|e| e.into_inner());
        for channel in channels {
            info!(channel = %channel, "joined channel");
            joined.insert(Self::normalize(channel));
        }
        Ok(())
    }

    async fn part_channels(&self, channels: &[String]) -> tooby_channels::Result<()> {
        let lines: Vec<String> = channels.iter().map(|c| irc::part(c)).collect();
        self.writer.send_all(&lines).await?;

        let mut joined = self.joined.lock().unwrap_or_else(|e| e.into_inner());
        for channel in channels {
            info!(channel = %channel, "parted channel");
            joined.remove(&Self::normalize(channel));
        }
        Ok(())
    }
}
