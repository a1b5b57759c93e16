use {
    std::sync::Arc,
    tokio::{
        io::{AsyncWrite, AsyncWriteExt},
        sync::Mutex,
    },
    tracing::debug,
};

use crate::Result;

type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared write half of the IRC connection.
///
/// Cloned into the emit stage and the join/part control handle; the lock
/// keeps their lines from interleaving.
#[derive(Clone)]
pub struct IrcWriter {
    inner: Arc<Mutex<BoxedWrite>>,
}

impl IrcWriter {
    pub fn new(write: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(write))),
        }
    }

    /// Send one line, appending `\r\n`.
    pub async fn send(&self, line: &str) -> Result<()> {
        self.send_all(&[line]).await
    }

    /// Send several lines back to back under one lock.
    pub async fn send_all<S: AsRef<str>>(&self, lines: &[S]) -> Result<()> {
        let mut write = self.inner.lock().await;
        for line in lines {
            let line = line.as_ref();
            if line.starts_with("PASS ") {
                debug!(line = "PASS ********", "irc send");
            } else {
                debug!(line, "irc send");
            }
            write.write_all(line.as_bytes()).await?;
            write.write_all(b"\r\n").await?;
        }
        write.flush().await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tokio::io::AsyncReadExt};

    #[tokio::test]
    async fn lines_are_crlf_terminated() {
        let (write, mut read) = tokio::io::duplex(256);
        let writer = IrcWriter::new(write);
        writer.send_all(&["PASS oauth:abc", "NICK toobybot"]).await.unwrap();
        writer.send("JOIN #room").await.unwrap();
        drop(writer);

        let mut out = String::new();
        read.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "PASS oauth:abc\r\nNICK toobybot\r\nJOIN #room\r\n");
    }
}
