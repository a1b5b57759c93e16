use {
    anyhow::{Result, bail},
    std::sync::Arc,
    tooby_channels::ChannelRegistry,
    tooby_config::{Severity, ToobyConfig, TwitchAccountConfig, validate::validate_twitch},
    tooby_store::{RecordStore, SqliteStore},
    tooby_twitch::{PipelineConfig, TwitchPlugin},
    tracing::{error, info, warn},
};

/// Connect every configured platform and serve until Ctrl-C or until every
/// connection has closed.
pub async fn run(config: ToobyConfig) -> Result<()> {
    let store: Arc<dyn RecordStore> =
        Arc::new(SqliteStore::connect(&config.store.database_url).await?);

    let (account, source) = twitch_account(&config, store.as_ref()).await?;
    let report = validate_twitch(&account, source);
    for d in &report.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
        }
    }
    if report.has_errors() {
        bail!("twitch connection settings are invalid (see {source})");
    }

    let mut registry = ChannelRegistry::new();
    registry.register(Box::new(
        TwitchPlugin::new(account, Arc::clone(&store))
            .with_pipeline_config(PipelineConfig::from(&config.interpreter)),
    ));
    registry.start_all().await?;
    log_statuses(&registry);

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted, shutting down");
        },
        closed = registry.wait_all() => {
            closed?;
            info!("all connections closed");
        },
    }
    registry.stop_all().await;
    log_statuses(&registry);
    Ok(())
}

fn log_statuses(registry: &ChannelRegistry) {
    for status in registry.statuses() {
        info!(
            plugin = %status.plugin_id,
            connected = status.connected,
            details = status.details.as_deref().unwrap_or("-"),
            "channel status"
        );
    }
}

/// Twitch settings from the config file, else from the store's
/// connection-setting records. Also returns where they came from.
async fn twitch_account(
    config: &ToobyConfig,
    store: &dyn RecordStore,
) -> Result<(TwitchAccountConfig, &'static str)> {
    match &config.twitch {
        Some(account) => Ok((account.clone(), "twitch")),
        None => {
            info!("no [twitch] section in config, reading connection settings from the store");
            Ok((store.connection_settings("twitch").await?, "settings.twitch"))
        },
    }
}
