use {
    super::plugin::{ChannelHealthSnapshot, ChannelPlugin},
    crate::Result,
    std::collections::BTreeMap,
    tracing::{info, warn},
};

/// Registry of all loaded channel plugins.
#[derive(Default)]
pub struct ChannelRegistry {
    plugins: BTreeMap<String, Box<dyn ChannelPlugin>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn ChannelPlugin>) {
        info!(plugin = plugin.id(), name = plugin.name(), "registered channel plugin");
        self.plugins.insert(plugin.id().to_string(), plugin);
    }

    /// Start every plugin. Stops at the first failure.
    pub async fn start_all(&mut self) -> Result<()> {
        for (id, plugin) in &mut self.plugins {
            info!(plugin = %id, "starting channel plugin");
            plugin.start().await?;
        }
        Ok(())
    }

    /// Stop every plugin, logging failures instead of aborting.
    pub async fn stop_all(&mut self) {
        for (id, plugin) in &mut self.plugins {
            if let Err(e) = plugin.stop().await {
                warn!(plugin = %id, error = %e, "failed to stop channel plugin");
            }
        }
    }

    /// Wait until every plugin's connection has ended.
    pub async fn wait_all(&mut self) -> Result<()> {
        for plugin in self.plugins.values_mut() {
            plugin.wait().await?;
        }
        Ok(())
    }

    /// One health snapshot per plugin, ordered by id.
    pub fn statuses(&self) -> Vec<ChannelHealthSnapshot> {
        self.plugins.values().map(|p| p.status()).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::Error, async_trait::async_trait};

    #[derive(Default)]
    struct FakePlugin {
        id: String,
        running: bool,
        fail_start: bool,
    }

    #[async_trait]
    impl ChannelPlugin for FakePlugin {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "Fake"
        }

        async fn start(&mut self) -> Result<()> {
            if self.fail_start {
                return Err(Error::unavailable("no network"));
            }
            self.running = true;
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            self.running = false;
            Ok(())
        }

        async fn wait(&mut self) -> Result<()> {
            Ok(())
        }

        fn status(&self) -> ChannelHealthSnapshot {
            ChannelHealthSnapshot {
                connected: self.running,
                plugin_id: self.id.clone(),
                details: None,
            }
        }
    }

    fn fake(id: &str) -> Box<dyn ChannelPlugin> {
        Box::new(FakePlugin {
            id: id.into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn start_and_stop_all() {
        let mut registry = ChannelRegistry::new();
        registry.register(fake("twitch"));
        registry.register(fake("discord"));

        registry.start_all().await.unwrap();
        let statuses = registry.statuses();
        let ids: Vec<&str> = statuses.iter().map(|s| s.plugin_id.as_str()).collect();
        assert_eq!(ids, vec!["discord", "twitch"]);
        assert!(statuses.iter().all(|s| s.connected));

        registry.stop_all().await;
        assert!(registry.statuses().iter().all(|s| !s.connected));
        registry.wait_all().await.unwrap();
    }

    #[tokio::test]
    async fn start_failure_propagates() {
        let mut registry = ChannelRegistry::new();
        registry.register(Box::new(FakePlugin {
            id: "twitch".into(),
            fail_start: true,
            ..Default::default()
        }));
        assert!(registry.start_all().await.is_err());
        assert!(!registry.statuses()[0].connected);
    }
}
