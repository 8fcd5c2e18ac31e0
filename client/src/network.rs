//! WebSocket transport to the game server
//!
//! The connection runs as a task on a tokio runtime and talks to the game
//! through two unbounded channels: lifecycle/message events in, text frames
//! out. The game only ever sees `TransportEvent`s and a `send` method.

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Connection lifecycle and inbound text, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Close,
}

/// Outbound half of a connection
pub trait Transport {
    fn send(&mut self, text: String);
}

/// Collects outbound frames in memory
impl Transport for Vec<String> {
    fn send(&mut self, text: String) {
        self.push(text);
    }
}

/// Handle to a WebSocket connection task
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    /// Set once the connection task is gone, so the loss is logged once
    task_gone: bool,
}

impl WsTransport {
    /// Starts connecting to `url` on `handle`. With `reconnect` set, the
    /// task keeps retrying after that delay whenever the connection drops.
    pub fn spawn(handle: &Handle, url: String, reconnect: Option<Duration>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        handle.spawn(run_connection(url, reconnect, outbound_rx, event_tx));

        Self {
            outbound: outbound_tx,
            events: event_rx,
            task_gone: false,
        }
    }

    /// Next pending event without waiting
    pub fn try_next_event(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    /// Waits for the next event. `None` once the connection task has ended.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

impl Transport for WsTransport {
    fn send(&mut self, text: String) {
        if self.outbound.send(text).is_err() && !self.task_gone {
            warn!("Connection task has exited, dropping outbound frames");
            self.task_gone = true;
        }
    }
}

async fn run_connection(
    url: String,
    reconnect: Option<Duration>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    loop {
        info!("Connecting to {}", url);

        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                // Anything queued while offline describes stale state
                while outbound.try_recv().is_ok() {}

                if events.send(TransportEvent::Open).is_err() {
                    return;
                }

                let (mut sink, mut source) = stream.split();
                let mut game_gone = false;

                loop {
                    tokio::select! {
                        incoming = source.next() => match incoming {
                            Some(Ok(Message::Text(text))) => {
                                if events.send(TransportEvent::Message(text)).is_err() {
                                    game_gone = true;
                                    break;
                                }
                            }
                            Some(Ok(Message::Close(frame))) => {
                                debug!("Server closed connection: {:?}", frame);
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!("WebSocket error: {}", e);
                                break;
                            }
                            None => break,
                        },

                        outgoing = outbound.recv() => match outgoing {
                            Some(text) => {
                                if let Err(e) = sink.send(Message::Text(text)).await {
                                    warn!("Failed to send frame: {}", e);
                                    break;
                                }
                            }
                            None => {
                                game_gone = true;
                                break;
                            }
                        },
                    }
                }

                if game_gone {
                    let _ = sink.close().await;
                    return;
                }

                info!("Disconnected from {}", url);
                if events.send(TransportEvent::Close).is_err() {
                    return;
                }
            }
            Err(e) => error!("Failed to connect to {}: {}", url, e),
        }

        match reconnect {
            Some(delay) if !events.is_closed() => sleep(delay).await,
            _ => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_transport_records_in_order() {
        let mut sent: Vec<String> = Vec::new();
        sent.send("a".to_string());
        sent.send("b".to_string());
        assert_eq!(sent, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unreachable_server_ends_without_reconnect() {
        // Port 9 on loopback is not expected to accept WebSocket upgrades
        let mut transport =
            WsTransport::spawn(&Handle::current(), "ws://127.0.0.1:9".to_string(), None);

        let event = tokio::time::timeout(Duration::from_secs(5), transport.next_event())
            .await
            .expect("connection task should finish");
        assert_eq!(event, None);

        assert!(!transport.task_gone);
        transport.send("{}".to_string());
        assert!(transport.task_gone);
        transport.send("{}".to_string());
        assert!(transport.task_gone);
    }
}
