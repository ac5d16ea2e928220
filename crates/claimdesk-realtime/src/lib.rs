//! # claimdesk-realtime
//!
//! Client-side notification core for ClaimDesk. Provides:
//!
//! - A reconnecting WebSocket channel with capped exponential backoff
//! - Typed server events with forward-compatible decoding
//! - Cache invalidation signals for ticket and task lists
//! - A durable "seen" record and the unseen-task reconciliation store
//! - A single-popup presentation queue with per-session suppression
//! - A task poller as the fallback source of truth

pub mod connection;
pub mod dispatch;
pub mod engine;
pub mod invalidation;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod poller;

pub use connection::channel::{ChannelGuard, ChannelState, RealtimeChannel};
pub use connection::transport::{Connector, EventStream, WsConnector};
pub use connection::{ReconnectPolicy, endpoint_url};
pub use dispatch::EventDispatcher;
pub use engine::{EngineSession, Identity, NotificationEngine};
pub use invalidation::{Invalidation, InvalidationBus};
pub use message::types::{ClientFrame, NotificationKind, ServerEvent};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use notification::center::{NotificationCenter, UiEvent};
pub use notification::presentation::CloseReason;
pub use notification::toast::Toast;
pub use poller::TaskPoller;
