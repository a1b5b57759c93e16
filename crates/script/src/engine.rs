//! Substitution engine.

use {
    crate::{
        error::{Error, Result},
        scanner::{MAX_DEPTH, next_directive},
    },
    futures::future::BoxFuture,
    std::sync::Arc,
    tooby_channels::ChannelControl,
    tooby_common::Message,
    tooby_store::RecordStore,
    tracing::{debug, trace},
};

/// Most directives a single [`Interpreter::resolve`] call will splice in,
/// counting every branch resolved by `if` along the way. Records that expand
/// to themselves would otherwise loop forever.
pub const MAX_SUBSTITUTIONS: usize = 256;

/// Resolves scripts against a record store.
///
/// Cheap to clone; the store and the optional room control are shared.
#[derive(Clone)]
pub struct Interpreter {
    store: Arc<dyn RecordStore>,
    control: Option<Arc<dyn ChannelControl>>,
}

impl Interpreter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            control: None,
        }
    }

    /// Attach runtime room control for `join` and `part`.
    #[must_use]
    pub fn with_control(mut self, control: Arc<dyn ChannelControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub(crate) fn control(&self) -> Option<&Arc<dyn ChannelControl>> {
        self.control.as_ref()
    }

    /// Resolve every directive in `script` and return the final text.
    ///
    /// The first failing directive aborts the whole resolution; nothing
    /// partially substituted is returned.
    pub async fn resolve(&self, script: &str, message: &Message) -> Result<String> {
        let mut splices = 0;
        self.resolve_nested(script, message, 0, &mut splices).await
    }

    /// One level of resolution. `depth` counts re-entries through `if`;
    /// `splices` is shared by every level of a single [`Interpreter::resolve`].
    pub(crate) fn resolve_nested<'a>(
        &'a self,
        script: &'a str,
        message: &'a Message,
        depth: usize,
        splices: &'a mut usize,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if depth > MAX_DEPTH {
                return Err(Error::DepthExceeded { max: MAX_DEPTH });
            }
            let mut text = script.to_string();

            while let Some(span) = next_directive(&text)? {
                *splices += 1;
                if *splices > MAX_SUBSTITUTIONS {
                    return Err(Error::TooManySubstitutions {
                        limit: MAX_SUBSTITUTIONS,
                    });
                }

                let value = self
                    .dispatch_nested(span.interior(&text), message, depth, splices)
                    .await?;
                trace!(directive = span.interior(&text), value = %value, depth, "substituted");
                text.replace_range(span.start..=span.end, &value);
            }

            Ok(text)
        })
    }

    /// Resolve `script` as the response to `message`.
    ///
    /// Either way the message ends up marked for sending: with the resolved
    /// text, or with `Error: <cause>`. The error is returned for logging.
    pub async fn process(&self, message: &mut Message, script: &str) -> Result<()> {
        let outcome = self.resolve(script, message).await;
        message.send_to_server = true;
        match outcome {
            Ok(text) => {
                debug!(command = %message.command, author = %message.author, "resolved");
                message.response = text;
                Ok(())
            },
            Err(e) => {
                message.response = format!("Error: {e}");
                Err(e)
            },
        }
    }
}
