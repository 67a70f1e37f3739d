//! WebSocket link to the audio engine.
//!
//! Inbound text frames are parsed as [`EngineEvent`]s and forwarded to the
//! UI thread; queued [`UiMessage`]s are written out as text frames. The link
//! reconnects on its own with exponential backoff.

use futures_util::{Sink, SinkExt, StreamExt};
use mixdesk_types::{EngineEvent, UiMessage};
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::LinkError;
use crate::state::{AppMessage, ConnectionState};

type EngineStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The engine went away; try again
    Closed,
    /// The console dropped its command queue; stop for good
    Shutdown,
}

/// Client side of the engine message channel.
pub struct EngineLink {
    url: String,
}

impl EngineLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Spawn the connection loop on the current tokio runtime.
    ///
    /// Events go to `tx`, and `ctx` is asked to repaint whenever one arrives.
    /// The loop ends when every sender of `outbound` has been dropped.
    pub fn connect(
        self,
        tx: Sender<AppMessage>,
        ctx: egui::Context,
        outbound: UnboundedReceiver<UiMessage>,
    ) {
        tracing::info!("Connecting to engine: {}", self.url);
        tokio::spawn(async move {
            Self::connection_loop(self.url, tx, ctx, outbound).await;
        });
    }

    async fn connection_loop(
        url: String,
        tx: Sender<AppMessage>,
        ctx: egui::Context,
        mut outbound: UnboundedReceiver<UiMessage>,
    ) {
        let mut attempt = 1u32;
        let mut connected_before = false;

        loop {
            let _ = tx.send(AppMessage::ConnectionStateChanged(
                ConnectionState::Reconnecting { attempt },
            ));
            ctx.request_repaint();

            tracing::info!("Engine connection attempt {} to: {}", attempt, url);

            match tokio_tungstenite::connect_async(&url).await {
                Ok((ws_stream, _)) => {
                    tracing::info!("Connected to engine");
                    let _ = tx.send(AppMessage::ConnectionStateChanged(
                        ConnectionState::Connected,
                    ));
                    ctx.request_repaint();
                    attempt = 1;

                    let result =
                        Self::run_session(ws_stream, &tx, &ctx, &mut outbound, connected_before)
                            .await;
                    connected_before = true;

                    match result {
                        Ok(SessionEnd::Closed) => {
                            tracing::warn!("Engine connection lost, will attempt to reconnect...");
                        }
                        Ok(SessionEnd::Shutdown) => {
                            tracing::info!("Command queue closed, shutting down engine link");
                            let _ = tx.send(AppMessage::ConnectionStateChanged(
                                ConnectionState::Disconnected,
                            ));
                            return;
                        }
                        Err(e) => {
                            tracing::error!("Engine connection error: {}", e);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to connect to engine: {:?}", e);
                }
            }

            let _ = tx.send(AppMessage::ConnectionStateChanged(
                ConnectionState::Disconnected,
            ));
            ctx.request_repaint();

            let delay = backoff_delay(attempt);
            tracing::info!(
                "Waiting {}ms before reconnection attempt...",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;

            attempt += 1;
        }
    }

    async fn run_session(
        ws_stream: EngineStream,
        tx: &Sender<AppMessage>,
        ctx: &egui::Context,
        outbound: &mut UnboundedReceiver<UiMessage>,
        reconnected: bool,
    ) -> Result<SessionEnd, LinkError> {
        let (mut sink, mut stream) = ws_stream.split();

        // Commands issued while offline are not replayed; only readiness is
        let queued = drain_offline_queue(outbound);
        if queued.dropped > 0 {
            tracing::debug!(
                "Discarded {} commands queued while disconnected",
                queued.dropped
            );
        }
        if queued.loaded || reconnected {
            send_message(&mut sink, &UiMessage::Loaded).await?;
        }

        loop {
            tokio::select! {
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!("Received engine message: {}", text);
                        if let Some(event) = parse_event(&text) {
                            let _ = tx.send(AppMessage::Event(event));
                            ctx.request_repaint();
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::trace!("Received binary message (ignored)");
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is automatically handled by tokio-tungstenite
                        tracing::trace!("Received ping");
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Engine closed the connection");
                        return Ok(SessionEnd::Closed);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(SessionEnd::Closed),
                },
                outgoing = outbound.recv() => match outgoing {
                    Some(message) => send_message(&mut sink, &message).await?,
                    None => {
                        let _ = sink.close().await;
                        return Ok(SessionEnd::Shutdown);
                    }
                },
            }
        }
    }
}

/// What was waiting in the command queue when a session started.
#[derive(Debug, Default, PartialEq, Eq)]
struct OfflineQueue {
    loaded: bool,
    dropped: usize,
}

fn drain_offline_queue(outbound: &mut UnboundedReceiver<UiMessage>) -> OfflineQueue {
    let mut queued = OfflineQueue::default();
    while let Ok(message) = outbound.try_recv() {
        match message {
            UiMessage::Loaded => queued.loaded = true,
            UiMessage::Config(_) => queued.dropped += 1,
        }
    }
    queued
}

/// Parse a text frame from the engine, logging anything unrecognized.
fn parse_event(text: &str) -> Option<EngineEvent> {
    match serde_json::from_str::<EngineEvent>(text) {
        Ok(event) => {
            tracing::trace!("Parsed engine event: {}", event.description());
            Some(event)
        }
        Err(err) => {
            tracing::error!("Failed to parse engine event: {}", err);
            None
        }
    }
}

fn encode_message(message: &UiMessage) -> Result<Message, LinkError> {
    Ok(Message::text(serde_json::to_string(message)?))
}

async fn send_message<S>(sink: &mut S, message: &UiMessage) -> Result<(), LinkError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    tracing::trace!("Sending to engine: {}", message.description());
    sink.send(encode_message(message)?).await?;
    Ok(())
}

/// Exponential backoff: 1s, 2s, 4s, then 8s for every further attempt.
fn backoff_delay(attempt: u32) -> Duration {
    let delay_ms = 1000u64 * 2u64.pow(attempt.clamp(1, 4) - 1);
    Duration::from_millis(delay_ms)
}
