//! Websocket feed: delivers decoded messages to the engine task.
//!
//! The reader runs on a dedicated blocking thread and reconnects forever
//! with a fixed delay; the engine only ever sees decoded `serde_json`
//! values plus coarse connection events. Frames that are not JSON are
//! unrecognized input, not errors.

use std::thread;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, trace, warn};
use tungstenite::Message;

pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum FeedEvent {
    Connected,
    Message(Value),
    Disconnected,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("websocket error: {0}")]
    Socket(#[from] tungstenite::Error),
}

/// Spawn the blocking reader thread. It exits once the engine side of the
/// channel is dropped.
pub fn spawn(url: String, tx: UnboundedSender<FeedEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        match run_connection(&url, &tx) {
            // Channel closed: the engine is gone
            Ok(()) => return,
            Err(e) => warn!(error = %e, "feed connection lost"),
        }
        if tx.send(FeedEvent::Disconnected).is_err() {
            return;
        }
        thread::sleep(RECONNECT_DELAY);
    })
}

fn run_connection(url: &str, tx: &UnboundedSender<FeedEvent>) -> Result<(), FeedError> {
    let (mut socket, _response) = tungstenite::connect(url)?;
    info!(url, "feed connected");
    if tx.send(FeedEvent::Connected).is_err() {
        return Ok(());
    }

    loop {
        match socket.read()? {
            Message::Text(text) => match serde_json::from_str::<Value>(text.as_str()) {
                Ok(value) => {
                    if tx.send(FeedEvent::Message(value)).is_err() {
                        return Ok(());
                    }
                }
                Err(e) => trace!(error = %e, "ignoring non-JSON frame"),
            },
            Message::Close(_) => return Err(tungstenite::Error::ConnectionClosed.into()),
            // Ping/pong and binary frames carry nothing for us
            _ => {}
        }
    }
}
