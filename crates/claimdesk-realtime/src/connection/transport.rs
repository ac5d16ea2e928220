//! Socket transport seam.
//!
//! [`Connector`] opens a text-frame stream to the realtime endpoint. The
//! production implementation is [`WsConnector`]; tests substitute scripted
//! connectors.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{
    Connector as TlsConnector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config,
};
use tracing::debug;

use claimdesk_core::error::{AppError, ErrorKind};
use claimdesk_core::result::AppResult;

/// An open, bidirectional stream of text frames.
#[async_trait]
pub trait EventStream: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> AppResult<()>;

    /// Wait for the next text frame. `None` means the peer closed the stream.
    async fn next_text(&mut self) -> Option<AppResult<String>>;

    /// Close the stream. Errors during close are ignored.
    async fn close(&mut self);
}

/// Opens [`EventStream`]s.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug + 'static {
    /// Connect to `url`.
    async fn connect(&self, url: &str) -> AppResult<Box<dyn EventStream>>;
}

/// WebSocket connector backed by `tokio-tungstenite`.
///
/// `wss://` endpoints are verified against the bundled Mozilla root set.
#[derive(Debug, Clone)]
pub struct WsConnector {
    tls: Arc<ClientConfig>,
}

impl WsConnector {
    /// Create a connector with a rustls client configuration.
    pub fn new() -> AppResult<Self> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid TLS configuration", e)
            })?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self { tls: Arc::new(tls) })
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> AppResult<Box<dyn EventStream>> {
        let tls = TlsConnector::Rustls(self.tls.clone());
        let connected = connect_async_tls_with_config(url, None, false, Some(tls)).await;
        let (socket, response) = connected.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("Failed to connect to {url}"),
                e,
            )
        })?;
        debug!(url, status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WsEventStream { socket }))
    }
}

struct WsEventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

fn transport_error(e: tokio_tungstenite::tungstenite::Error) -> AppError {
    AppError::with_source(ErrorKind::Transport, "WebSocket error", e)
}

#[async_trait]
impl EventStream for WsEventStream {
    async fn send_text(&mut self, text: String) -> AppResult<()> {
        self.socket
            .send(Message::text(text))
            .await
            .map_err(transport_error)
    }

    async fn next_text(&mut self) -> Option<AppResult<String>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Server closed the WebSocket");
                    return None;
                }
                Ok(Message::Binary(data)) => {
                    debug!(len = data.len(), "Ignoring binary frame");
                }
                // ping/pong are answered by tungstenite itself
                Ok(_) => {}
                Err(e) => return Some(Err(transport_error(e))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}
