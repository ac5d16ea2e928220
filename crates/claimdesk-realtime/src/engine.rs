//! Wires the channel, dispatcher and poller to the signed-in identity.
//!
//! Without an identity nothing connects. Setting a new identity (or
//! clearing it) tears the previous session down before anything else
//! happens, cancelling reconnect timers, the poll loop and the popup timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use claimdesk_client::TicketApi;
use claimdesk_core::config::{AppConfig, RealtimeConfig};
use claimdesk_core::result::AppResult;
use claimdesk_core::types::UserId;

use crate::connection::backoff::ReconnectPolicy;
use crate::connection::channel::{ChannelGuard, ChannelState, RealtimeChannel};
use crate::connection::endpoint::endpoint_url;
use crate::connection::transport::Connector;
use crate::dispatch::EventDispatcher;
use crate::invalidation::{Invalidation, InvalidationBus};
use crate::metrics::RealtimeMetrics;
use crate::notification::center::NotificationCenter;
use crate::poller::TaskPoller;

/// The authenticated user notifications are delivered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Signed-in user.
    pub user_id: UserId,
}

impl Identity {
    /// Identity of `user_id`.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Background tasks serving one identity. Dropping it cancels them.
#[derive(Debug)]
pub struct EngineSession {
    user_id: UserId,
    channel: ChannelGuard,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineSession {
    /// User this session serves.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Current channel state.
    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Observe channel state changes.
    pub fn watch_channel(&self) -> watch::Receiver<ChannelState> {
        self.channel.watch_state()
    }

    /// Cancel everything and wait for the tasks to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.channel.close().await;
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!(error = %e, "Notification task failed");
            }
        }
        debug!(user_id = %self.user_id, "Engine session shut down");
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Root object of the notification core.
#[derive(Debug)]
pub struct NotificationEngine {
    api: Arc<dyn TicketApi>,
    connector: Arc<dyn Connector>,
    center: Arc<NotificationCenter>,
    bus: InvalidationBus,
    realtime: RealtimeConfig,
    endpoint: String,
    poll_interval: Duration,
    session: Mutex<Option<EngineSession>>,
}

impl NotificationEngine {
    /// Build an engine from configuration. Fails if the realtime endpoint
    /// cannot be derived from the API origin.
    pub fn new(
        config: &AppConfig,
        api: Arc<dyn TicketApi>,
        connector: Arc<dyn Connector>,
        center: Arc<NotificationCenter>,
    ) -> AppResult<Self> {
        let endpoint = endpoint_url(&config.api.origin, &config.realtime.path)?;
        debug!(endpoint = %endpoint, "Realtime endpoint resolved");

        Ok(Self {
            api,
            connector,
            center,
            bus: InvalidationBus::new(config.realtime.event_buffer_size),
            realtime: config.realtime.clone(),
            endpoint,
            poll_interval: config.notifications.poll_interval(),
            session: Mutex::new(None),
        })
    }

    /// Shared notification state.
    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    /// Invalidation bus (for list views that cache their own data).
    pub fn invalidations(&self) -> &InvalidationBus {
        &self.bus
    }

    /// Resolved realtime URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Shared counters.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        self.center.metrics()
    }

    /// Channel state of the active session, if any.
    pub async fn channel_state(&self) -> Option<ChannelState> {
        self.session.lock().await.as_ref().map(EngineSession::channel_state)
    }

    /// Observe the active session's channel state.
    pub async fn watch_channel(&self) -> Option<watch::Receiver<ChannelState>> {
        self.session.lock().await.as_ref().map(EngineSession::watch_channel)
    }

    /// Switch to `identity`, or stop everything with `None`.
    ///
    /// Setting the identity that is already active is a no-op while its
    /// channel is still live. After the channel gave up, the same identity
    /// starts a fresh session with a full retry budget.
    pub async fn set_identity(&self, identity: Option<Identity>) -> AppResult<()> {
        let mut slot = self.session.lock().await;

        if let (Some(current), Some(next)) = (slot.as_ref(), identity.as_ref()) {
            if current.user_id == next.user_id && !current.channel_state().is_final() {
                return Ok(());
            }
        }

        if let Some(previous) = slot.take() {
            info!(user_id = %previous.user_id, "Stopping notifications");
            previous.shutdown().await;
            self.center.logout();
        }

        let Some(identity) = identity else {
            return Ok(());
        };

        self.center.login(&identity.user_id)?;
        *slot = Some(self.start(identity.user_id));
        Ok(())
    }

    /// Stop everything.
    pub async fn shutdown(&self) {
        if let Err(e) = self.set_identity(None).await {
            warn!(error = %e, "Engine shutdown failed");
        }
    }

    fn start(&self, user_id: UserId) -> EngineSession {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(self.realtime.event_buffer_size.max(1));

        let mut channel = RealtimeChannel::new(
            self.connector.clone(),
            self.endpoint.clone(),
            ReconnectPolicy::from_config(&self.realtime),
            self.center.metrics().clone(),
        );
        if self.realtime.send_auth_frame {
            channel = channel.with_auth_frame(user_id.clone());
        }

        // subscribe before anything can publish
        let poller_signals = self.bus.subscribe();
        let channel = channel.spawn(tx);

        let dispatcher = EventDispatcher::new(self.center.clone(), self.bus.clone());
        let poller = TaskPoller::new(self.api.clone(), self.center.clone(), self.poll_interval);

        let tasks = vec![
            tokio::spawn(dispatcher.run(rx, cancel.child_token())),
            tokio::spawn(poller.run(poller_signals, cancel.child_token())),
            tokio::spawn(resync_on_reconnect(
                channel.watch_state(),
                self.bus.clone(),
                cancel.child_token(),
            )),
        ];

        info!(user_id = %user_id, endpoint = %self.endpoint, "Notifications started");
        EngineSession {
            user_id,
            channel,
            cancel,
            tasks,
        }
    }
}

/// Events pushed while the socket was down are lost, so every reopen after
/// the first triggers a full refetch.
async fn resync_on_reconnect(
    mut state: watch::Receiver<ChannelState>,
    bus: InvalidationBus,
    cancel: CancellationToken,
) {
    let mut opened_before = false;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        if *state.borrow_and_update() == ChannelState::Open {
            if opened_before {
                debug!("Realtime channel reopened, resynchronising");
                bus.publish(Invalidation::All);
            }
            opened_before = true;
        }
    }
}
