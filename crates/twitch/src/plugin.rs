use {
    async_trait::async_trait,
    std::sync::Arc,
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tooby_channels::{ChannelHealthSnapshot, ChannelPlugin},
    tooby_config::TwitchAccountConfig,
    tooby_script::Interpreter,
    tooby_store::RecordStore,
    tracing::{info, warn},
};

use crate::{connection, control::TwitchControl, pipeline, pipeline::PipelineConfig};

/// A live connection: its pipeline task, its stop switch and the room
/// handle the status report reads.
struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    control: Arc<TwitchControl>,
}

/// Twitch channel plugin. One instance drives one bot account.
pub struct TwitchPlugin {
    account: TwitchAccountConfig,
    store: Arc<dyn RecordStore>,
    pipeline: PipelineConfig,
    running: Option<Running>,
}

impl TwitchPlugin {
    pub fn new(account: TwitchAccountConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            account,
            store,
            pipeline: PipelineConfig::default(),
            running: None,
        }
    }

    #[must_use]
    pub fn with_pipeline_config(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

#[async_trait]
impl ChannelPlugin for TwitchPlugin {
    fn id(&self) -> &str {
        "twitch"
    }

    fn name(&self) -> &str {
        "Twitch"
    }

    async fn start(&mut self) -> tooby_channels::Result<()> {
        if self.running.is_some() {
            return Err(tooby_channels::Error::unavailable("twitch is already running"));
        }

        info!(botnick = %self.account.botnick, "connecting to twitch");
        let (reader, writer) = connection::connect(&self.account).await?;
        connection::handshake(&writer, &self.account).await?;

        let control = Arc::new(TwitchControl::with_joined(
            writer.clone(),
            &self.account.channels,
        ));
        let interpreter = Interpreter::new(Arc::clone(&self.store)).with_control(control.clone());

        let cancel = CancellationToken::new();
        let task = tokio::spawn(pipeline::run(
            reader,
            writer,
            interpreter,
            self.pipeline,
            cancel.clone(),
        ));

        self.running = Some(Running {
            cancel,
            task,
            control,
        });
        Ok(())
    }

    async fn stop(&mut self) -> tooby_channels::Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        info!("stopping twitch");
        running.cancel.cancel();
        if let Err(e) = running.task.await {
            warn!(error = %e, "twitch pipeline ended abnormally");
        }
        Ok(())
    }

    async fn wait(&mut self) -> tooby_channels::Result<()> {
        if let Some(running) = self.running.as_mut() {
            if let Err(e) = (&mut running.task).await {
                warn!(error = %e, "twitch pipeline ended abnormally");
            }
            self.running = None;
        }
        Ok(())
    }

    fn status(&self) -> ChannelHealthSnapshot {
        let (connected, details) = match &self.running {
            Some(r) if !r.cancel.is_cancelled() => (
                true,
                Some(format!(
                    "{} in {}",
                    self.account.botnick,
                    r.control.joined().join(", ")
                )),
            ),
            _ => (false, None),
        };
        ChannelHealthSnapshot {
            connected,
            plugin_id: self.id().to_string(),
            details,
        }
    }
}
