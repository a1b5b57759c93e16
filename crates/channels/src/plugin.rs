use {crate::Result, async_trait::async_trait};

/// Core channel plugin trait. Each messaging platform implements this.
///
/// A plugin is built with its connection settings already resolved, so the
/// lifecycle methods take no configuration.
#[async_trait]
pub trait ChannelPlugin: Send + Sync {
    /// Channel identifier (e.g. "twitch").
    fn id(&self) -> &str;

    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Connect and start processing messages in the background.
    async fn start(&mut self) -> Result<()>;

    /// Stop processing and drop the connection. Stopping a plugin that is not
    /// running is a no-op.
    async fn stop(&mut self) -> Result<()>;

    /// Resolves once the connection has ended on its own (EOF, read error)
    /// or after [`ChannelPlugin::stop`]. Resolves immediately when not running.
    async fn wait(&mut self) -> Result<()>;

    fn status(&self) -> ChannelHealthSnapshot;
}

/// Join and leave rooms on a live connection.
#[async_trait]
pub trait ChannelControl: Send + Sync {
    /// Join every channel in `channels` (names without `#`).
    async fn join_channels(&self, channels: &[String]) -> Result<()>;

    /// Leave every channel in `channels` (names without `#`).
    async fn part_channels(&self, channels: &[String]) -> Result<()>;
}

/// Channel health snapshot.
#[derive(Debug, Clone)]
pub struct ChannelHealthSnapshot {
    pub connected: bool,
    pub plugin_id: String,
    pub details: Option<String>,
}
