//! Reconnecting realtime channel.
//!
//! The channel owns one background task that connects, forwards decoded
//! [`ServerEvent`]s to an mpsc receiver and reconnects with capped
//! exponential backoff after unexpected closes. The task lives exactly as
//! long as its [`ChannelGuard`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use claimdesk_core::error::{AppError, ErrorKind};
use claimdesk_core::result::AppResult;
use claimdesk_core::types::UserId;

use super::backoff::ReconnectPolicy;
use super::transport::{Connector, EventStream};
use crate::message::serializer::{deserialize_event, serialize_frame};
use crate::message::types::{ClientFrame, ServerEvent};
use crate::message::validator::validate_inbound;
use crate::metrics::RealtimeMetrics;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// First connect in progress.
    Connecting,
    /// Socket open and delivering events.
    Open,
    /// Waiting for (or performing) reconnect number `attempt`.
    Reconnecting {
        /// 1-based reconnect attempt.
        attempt: u32,
    },
    /// Torn down by its owner.
    Closed,
    /// Stopped after exhausting the retry budget.
    GaveUp,
}

impl ChannelState {
    /// Whether the background task has stopped for good.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Closed | Self::GaveUp)
    }
}

/// Why a single socket session ended.
enum SessionEnd {
    /// Peer closed or the socket failed.
    Dropped,
    /// The owner cancelled the channel.
    Cancelled,
    /// Nobody is listening for events anymore.
    ConsumerGone,
}

/// Configuration of a channel before it is spawned.
#[derive(Debug)]
pub struct RealtimeChannel {
    connector: Arc<dyn Connector>,
    url: String,
    policy: ReconnectPolicy,
    auth_user: Option<UserId>,
    metrics: Arc<RealtimeMetrics>,
}

impl RealtimeChannel {
    /// Describe a channel to `url`.
    pub fn new(
        connector: Arc<dyn Connector>,
        url: impl Into<String>,
        policy: ReconnectPolicy,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            connector,
            url: url.into(),
            policy,
            auth_user: None,
            metrics,
        }
    }

    /// Send an auth frame for `user_id` after every successful open.
    pub fn with_auth_frame(mut self, user_id: UserId) -> Self {
        self.auth_user = Some(user_id);
        self
    }

    /// Start the background task. Decoded events are sent to `events`.
    pub fn spawn(self, events: mpsc::Sender<ServerEvent>) -> ChannelGuard {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);

        let handle = tokio::spawn(self.run(events, state_tx, cancel.clone()));

        ChannelGuard {
            cancel,
            handle: Some(handle),
            state: state_rx,
        }
    }

    async fn run(
        self,
        events: mpsc::Sender<ServerEvent>,
        state: watch::Sender<ChannelState>,
        cancel: CancellationToken,
    ) {
        let mut attempt: u32 = 0;

        loop {
            let connected = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.connector.connect(&self.url) => result,
            };

            match connected {
                Ok(mut stream) => {
                    attempt = 0;
                    self.metrics.record_connect();
                    state.send_replace(ChannelState::Open);
                    info!(url = %self.url, "Realtime channel open");

                    if let Err(e) = self.authenticate(stream.as_mut()).await {
                        warn!(error = %e, "Failed to send auth frame");
                    }

                    let end = self.pump(stream.as_mut(), &events, &cancel).await;
                    match end {
                        SessionEnd::Dropped => {
                            warn!(url = %self.url, "Realtime connection closed unexpectedly");
                        }
                        SessionEnd::Cancelled | SessionEnd::ConsumerGone => {
                            stream.close().await;
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, attempt, "Realtime connection failed");
                }
            }

            if !self.policy.should_retry(attempt) {
                warn!(
                    url = %self.url,
                    max_retries = self.policy.max_retries,
                    "Realtime channel max retries reached, giving up"
                );
                state.send_replace(ChannelState::GaveUp);
                return;
            }

            let delay = self.policy.delay_for_attempt(attempt);
            attempt += 1;
            self.metrics.record_reconnect();
            state.send_replace(ChannelState::Reconnecting { attempt });
            debug!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling reconnect");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        state.send_replace(ChannelState::Closed);
        debug!(url = %self.url, "Realtime channel closed");
    }

    async fn authenticate(&self, stream: &mut dyn EventStream) -> AppResult<()> {
        let Some(user_id) = &self.auth_user else {
            return Ok(());
        };
        let frame = serialize_frame(&ClientFrame::Auth {
            user_id: user_id.clone(),
        })?;
        stream.send_text(frame).await
    }

    async fn pump(
        &self,
        stream: &mut dyn EventStream,
        events: &mpsc::Sender<ServerEvent>,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return SessionEnd::Cancelled,
                next = stream.next_text() => next,
            };

            let raw = match next {
                None => return SessionEnd::Dropped,
                Some(Err(e)) => {
                    warn!(error = %e, "Realtime socket error");
                    return SessionEnd::Dropped;
                }
                Some(Ok(raw)) => raw,
            };

            self.metrics.record_message();
            let event = match decode(&raw) {
                Ok(event) => event,
                Err(e) => {
                    self.metrics.record_malformed();
                    warn!(error = %e, "Discarding malformed realtime message");
                    continue;
                }
            };

            if let ServerEvent::Unknown = event {
                debug!("Ignoring unknown realtime event");
                continue;
            }

            if events.send(event).await.is_err() {
                return SessionEnd::ConsumerGone;
            }
        }
    }
}

fn decode(raw: &str) -> AppResult<ServerEvent> {
    validate_inbound(raw)?;
    deserialize_event(raw).map_err(|e| {
        AppError::with_source(ErrorKind::Serialization, "Unexpected event payload", e)
    })
}

/// Owner of a running channel. Dropping it cancels pending backoff timers
/// and closes the socket.
#[derive(Debug)]
pub struct ChannelGuard {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    state: watch::Receiver<ChannelState>,
}

impl ChannelGuard {
    /// Current state.
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Cancel the channel and wait for the socket to close.
    pub async fn close(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Realtime channel task failed");
            }
        }
    }

    /// Like [`ChannelGuard::close`], consuming the guard.
    pub async fn shutdown(mut self) {
        self.close().await;
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
