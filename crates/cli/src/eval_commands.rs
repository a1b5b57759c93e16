use {
    anyhow::Result,
    clap::Args,
    std::sync::Arc,
    tooby_common::{Message, MessageType},
    tooby_config::ToobyConfig,
    tooby_script::Interpreter,
    tooby_store::{InMemoryStore, RecordStore, SqliteStore},
    tracing::debug,
};

#[derive(Args)]
pub struct EvalArgs {
    /// Script to resolve, e.g. "{sender}, {var get greeting}!".
    pub script: String,

    /// Author of the simulated chat message.
    #[arg(long, default_value = "tooby")]
    pub author: String,

    /// Channel the simulated message was posted in.
    #[arg(long, default_value = "tooby")]
    pub channel: String,

    /// Full chat line, e.g. "!so @bob". Feeds `{1}` and `{user}`.
    #[arg(long)]
    pub text: Option<String>,

    /// Resolve against an empty in-memory store instead of the database.
    #[arg(long, default_value_t = false)]
    pub memory: bool,
}

pub async fn handle_eval(args: EvalArgs, config: &ToobyConfig) -> Result<()> {
    let store: Arc<dyn RecordStore> = if args.memory {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(SqliteStore::connect(&config.store.database_url).await?)
    };
    let response = evaluate(store, &args, config.interpreter.command_prefix).await;
    println!("{response}");
    Ok(())
}

/// Resolve `args.script` for a simulated chat message and return the reply.
async fn evaluate(store: Arc<dyn RecordStore>, args: &EvalArgs, prefix: char) -> String {
    let mut message = simulated_message(args, prefix);
    if let Err(e) = Interpreter::new(store).process(&mut message, &args.script).await {
        debug!(error = %e, "script failed");
    }
    message.response
}

fn simulated_message(args: &EvalArgs, prefix: char) -> Message {
    let mut message = Message {
        message_type: MessageType::Channel,
        platform: "cli".into(),
        author: args.author.clone(),
        channel: args.channel.clone(),
        text: args.text.clone().unwrap_or_else(|| format!("{prefix}eval")),
        ..Default::default()
    };
    message.parse_command(prefix);
    message
}
