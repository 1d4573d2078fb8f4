//! Network Layer
//!
//! REST client for the quiz backend and the realtime ranking feed.
//! Everything that talks to the outside world lives here.

pub mod api;
pub mod protocol;
pub mod transport;
pub mod channel;

pub use api::{GameApi, HttpApi, RemoteError, SubmitQuizResponse, HealthStatus};
pub use protocol::{FeedMessage, RankingUpdate};
pub use transport::{Connector, FeedConnection, TransportError, TransportEvent, WsConnector};
pub use channel::{
    ChannelConfig, ChannelEvent, ChannelListener, ConnectionState, RealtimeChannel,
    TracingListener,
};
