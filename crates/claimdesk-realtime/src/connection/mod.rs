//! Client side of the realtime WebSocket connection.

pub mod backoff;
pub mod channel;
pub mod endpoint;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use channel::{ChannelGuard, ChannelState, RealtimeChannel};
pub use endpoint::endpoint_url;
pub use transport::{Connector, EventStream, WsConnector};
