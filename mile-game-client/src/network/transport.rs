//! Feed Transport
//!
//! The message-oriented connection under the realtime channel, behind two
//! small traits so the channel can run over WebSocket in production and a
//! scripted connection in tests.

use std::time::Duration;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

/// Close code for a normal, requested closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Default limit on the TCP connect plus WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection-level failures. Reported to the listener, never returned to
/// the channel's caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Opening the connection failed.
    #[error("Failed to connect to {url}: {reason}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// Reading from an open connection failed.
    #[error("Read error: {0}")]
    Read(String),

    /// Sending the close frame failed.
    #[error("Close error: {0}")]
    Close(String),
}

/// What an open connection produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text payload (may still be a keepalive).
    Text(String),
    /// A non-text frame (ping, pong, binary).
    Keepalive,
    /// A transport error. The connection reports `Closed` afterwards.
    Error(TransportError),
    /// The connection is gone.
    Closed {
        /// Close code, when the peer sent one.
        code: Option<u16>,
    },
}

/// Opens connections to a feed URL.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Connection type produced.
    type Connection: FeedConnection;

    /// Open a new connection.
    async fn open(&mut self, url: &str) -> Result<Self::Connection, TransportError>;
}

/// An open feed connection.
#[allow(async_fn_in_trait)]
pub trait FeedConnection {
    /// Wait for the next transport event.
    async fn next_event(&mut self) -> TransportEvent;

    /// Close with `code`.
    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError>;
}

// =============================================================================
// WEBSOCKET
// =============================================================================

/// [`Connector`] over tokio-tungstenite.
#[derive(Debug, Clone, Copy)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    /// Give up on an open that takes longer than `connect_timeout`.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

/// A live WebSocket feed connection.
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Set once the socket is known dead; later reads report `Closed`.
    finished: bool,
}

impl Connector for WsConnector {
    type Connection = WsConnection;

    async fn open(&mut self, url: &str) -> Result<WsConnection, TransportError> {
        let connect_error = |reason: String| TransportError::Connect {
            url: url.to_string(),
            reason,
        };

        let (stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| connect_error(format!("timed out after {:?}", self.connect_timeout)))?
            .map_err(|e| connect_error(e.to_string()))?;
        debug!("WebSocket handshake complete ({})", response.status());

        Ok(WsConnection {
            stream,
            finished: false,
        })
    }
}

impl FeedConnection for WsConnection {
    async fn next_event(&mut self) -> TransportEvent {
        if self.finished {
            return TransportEvent::Closed { code: None };
        }

        match self.stream.next().await {
            Some(Ok(Message::Text(text))) => TransportEvent::Text(text),
            Some(Ok(Message::Close(frame))) => {
                self.finished = true;
                TransportEvent::Closed {
                    code: frame.map(|f| u16::from(f.code)),
                }
            }
            Some(Ok(_)) => TransportEvent::Keepalive,
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                self.finished = true;
                TransportEvent::Closed { code: None }
            }
            Some(Err(e)) => {
                // The socket is unusable after a read error.
                self.finished = true;
                TransportEvent::Error(TransportError::Read(e.to_string()))
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError> {
        self.finished = true;
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };

        match self.stream.close(Some(frame)).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::Close(e.to_string())),
        }
    }
}
