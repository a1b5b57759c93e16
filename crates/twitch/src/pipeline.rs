//! Decode → interpret → emit.
//!
//! Three tasks joined by capacity-1 channels, so at most one frame is in
//! flight at each boundary and responses leave in the order lines arrived.
//! Decode is the only stage blocked on the network; it stops when the
//! cancellation token fires, and fires it itself at EOF or on a read error.
//! Interpret and emit drain whatever is already in flight and exit once the
//! stage before them has.

use {
    std::time::Duration,
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader},
        sync::mpsc,
    },
    tokio_util::sync::CancellationToken,
    tooby_common::Message,
    tooby_config::InterpreterConfig,
    tooby_script::Interpreter,
    tracing::{debug, info, trace, warn},
};

use crate::{
    irc::{self, Frame},
    writer::IrcWriter,
};

/// Longest inbound line kept, terminator included. Twitch caps its own lines
/// well below this.
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// Per-connection interpreter settings.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub command_prefix: char,
    /// `None` lets a script run for as long as it takes.
    pub resolve_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&InterpreterConfig::default())
    }
}

impl From<&InterpreterConfig> for PipelineConfig {
    fn from(config: &InterpreterConfig) -> Self {
        Self {
            command_prefix: config.command_prefix,
            resolve_timeout: config.resolve_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Run the pipeline until the connection closes or `cancel` fires.
pub async fn run<R>(
    reader: R,
    writer: IrcWriter,
    interpreter: Interpreter,
    config: PipelineConfig,
    cancel: CancellationToken,
) where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (decoded_tx, decoded_rx) = mpsc::channel(1);
    let (interpreted_tx, interpreted_rx) = mpsc::channel(1);

    let decode = tokio::spawn(decode(
        reader,
        decoded_tx,
        config.command_prefix,
        cancel.clone(),
    ));
    let interpret = tokio::spawn(interpret(
        decoded_rx,
        interpreted_tx,
        interpreter,
        config.resolve_timeout,
    ));
    let emit = tokio::spawn(emit(interpreted_rx, writer, cancel));

    let (decode, interpret, emit) = tokio::join!(decode, interpret, emit);
    for (stage, result) in [("decode", decode), ("interpret", interpret), ("emit", emit)] {
        if let Err(e) = result {
            warn!(stage, error = %e, "pipeline stage failed");
        }
    }
    info!("pipeline stopped");
}

async fn decode<R>(reader: R, tx: mpsc::Sender<Frame>, prefix: char, cancel: CancellationToken)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = read_line_capped(&mut reader, &mut buf) => read,
        };
        match read {
            Ok(0) => {
                info!("connection closed by server");
                cancel.cancel();
                break;
            },
            Ok(consumed) if consumed > buf.len() => {
                warn!(bytes = consumed, max = MAX_LINE_BYTES, "dropping oversized line");
                continue;
            },
            Ok(_) => {},
            Err(e) => {
                warn!(error = %e, "read failed");
                cancel.cancel();
                break;
            },
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        trace!(line, "irc recv");

        if tx.send(irc::parse_line(line, prefix)).await.is_err() || cancel.is_cancelled() {
            break;
        }
    }
}

/// Read through the next `\n`, keeping at most [`MAX_LINE_BYTES`] of the line
/// in `buf`. Returns how many bytes were consumed from the reader.
async fn read_line_capped<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(consumed);
        }
        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        let room = MAX_LINE_BYTES.saturating_sub(buf.len());
        buf.extend_from_slice(&available[..used.min(room)]);
        reader.consume(used);
        consumed += used;
        if done {
            return Ok(consumed);
        }
    }
}

async fn interpret(
    mut rx: mpsc::Receiver<Frame>,
    tx: mpsc::Sender<Frame>,
    interpreter: Interpreter,
    timeout: Option<Duration>,
) {
    while let Some(frame) = rx.recv().await {
        let frame = match frame {
            Frame::Chat(mut message) if message.has_command() => {
                respond(&interpreter, &mut message, timeout).await;
                Frame::Chat(message)
            },
            other => other,
        };
        if tx.send(frame).await.is_err() {
            break;
        }
    }
}

/// Look up and run the command's script, leaving the reply on `message`.
async fn respond(interpreter: &Interpreter, message: &mut Message, timeout: Option<Duration>) {
    let script = match interpreter.store().script(&message.command).await {
        Ok(script) => script,
        Err(tooby_store::Error::NotFound { .. }) => {
            debug!(command = %message.command, "no such command");
            return;
        },
        Err(e) => {
            warn!(command = %message.command, error = %e, "command lookup failed");
            return;
        },
    };

    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, interpreter.process(message, &script))
            .await
            .ok(),
        None => Some(interpreter.process(message, &script).await),
    };

    match outcome {
        Some(Ok(())) => {},
        Some(Err(e)) => {
            info!(command = %message.command, author = %message.author, error = %e, "command failed");
        },
        None => {
            warn!(command = %message.command, author = %message.author, "command timed out");
            message.response = "Error: timed out".into();
            message.send_to_server = true;
        },
    }
}

async fn emit(mut rx: mpsc::Receiver<Frame>, writer: IrcWriter, cancel: CancellationToken) {
    while let Some(frame) = rx.recv().await {
        let line = match frame {
            Frame::KeepAlive(payload) => Some(irc::pong(&payload)),
            Frame::Chat(message) => irc::response_line(&message),
        };
        let Some(line) = line else {
            continue;
        };
        if let Err(e) = writer.send(&line).await {
            warn!(error = %e, "write failed");
            cancel.cancel();
            break;
        }
    }
}
