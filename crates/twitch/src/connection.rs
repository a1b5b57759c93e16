//! Connecting and logging in to Twitch IRC.

use {
    rustls::{ClientConfig, RootCertStore, pki_types::ServerName},
    secrecy::ExposeSecret,
    std::sync::Arc,
    tokio::{io::AsyncRead, net::TcpStream},
    tokio_rustls::TlsConnector,
    tooby_config::TwitchAccountConfig,
    tracing::{debug, info, warn},
};

use crate::{Error, Result, irc, writer::IrcWriter};

pub type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;

/// Open the transport described by `config` (TLS unless `tls = false`).
pub async fn connect(config: &TwitchAccountConfig) -> Result<(BoxedRead, IrcWriter)> {
    let tcp = TcpStream::connect((config.server.as_str(), config.port)).await?;
    info!(server = %config.server, port = config.port, tls = config.tls, "connected to irc server");

    if !config.tls {
        let (read, write) = tcp.into_split();
        return Ok((Box::new(read), IrcWriter::new(write)));
    }

    let name = ServerName::try_from(config.server.clone())?;
    let stream = tls_connector().connect(name, tcp).await?;
    let (read, write) = tokio::io::split(stream);
    Ok((Box::new(read), IrcWriter::new(write)))
}

fn tls_connector() -> TlsConnector {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        warn!(error = %e, "failed to load a native certificate");
    }
    for cert in native.certs {
        let _ = roots.add(cert);
    }
    debug!(roots = roots.len(), "loaded tls roots");

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

/// Log in, join every configured channel and post the greeting there.
pub async fn handshake(writer: &IrcWriter, config: &TwitchAccountConfig) -> Result<()> {
    if !config.has_token() {
        return Err(Error::message("twitch oauth token is required"));
    }
    if config.botnick.is_empty() {
        return Err(Error::message("twitch botnick is required"));
    }

    writer
        .send_all(&[
            irc::pass(config.oauth_token.expose_secret()),
            irc::nick(&config.botnick),
        ])
        .await?;
    info!(botnick = %config.botnick, "logged in");

    for channel in &config.channels {
        info!(channel = %channel, "joining channel");
        writer.send(&irc::join(channel)).await?;
        if let Some(greeting) = &config.greeting {
            writer.send(&irc::privmsg_channel(channel, greeting)).await?;
        }
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret, tokio::io::AsyncReadExt};

    fn account() -> TwitchAccountConfig {
        TwitchAccountConfig {
            botnick: "toobybot".into(),
            oauth_token: Secret::new("oauth:abc123".into()),
            channels: vec!["jazzyeagle".into(), "stylerun09".into()],
            greeting: Some("The eagle has landed.".into()),
            ..Default::default()
        }
    }

    async fn handshake_output(config: &TwitchAccountConfig) -> (Result<()>, String) {
        let (write, mut read) = tokio::io::duplex(1024);
        let writer = IrcWriter::new(write);
        let result = handshake(&writer, config).await;
        drop(writer);
        let mut out = String::new();
        read.read_to_string(&mut out).await.unwrap();
        (result, out)
    }

    #[tokio::test]
    async fn logs_in_joins_and_greets() {
        let (result, out) = handshake_output(&account()).await;
        result.unwrap();
        assert_eq!(
            out,
            concat!(
                "PASS oauth:abc123\r\n",
                "NICK toobybot\r\n",
                "JOIN #jazzyeagle\r\n",
                "PRIVMSG #jazzyeagle :The eagle has landed.\r\n",
                "JOIN #stylerun09\r\n",
                "PRIVMSG #stylerun09 :The eagle has landed.\r\n",
            )
        );
    }

    #[tokio::test]
    async fn no_greeting_means_join_only() {
        let mut cfg = account();
        cfg.greeting = None;
        cfg.channels.truncate(1);
        let (result, out) = handshake_output(&cfg).await;
        result.unwrap();
        assert_eq!(out, "PASS oauth:abc123\r\nNICK toobybot\r\nJOIN #jazzyeagle\r\n");
    }

    #[tokio::test]
    async fn missing_credentials_send_nothing() {
        let mut cfg = account();
        cfg.oauth_token = Secret::new(String::new());
        let (result, out) = handshake_output(&cfg).await;
        assert!(result.is_err());
        assert_eq!(out, "");
    }
}
