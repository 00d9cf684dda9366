//! Background STOMP connection with automatic reconnect.
//!
//! [`RealtimeClient::spawn`] starts one task that owns the WebSocket. The
//! returned [`RealtimeHandle`] talks to it over a command channel and events
//! arrive on an `mpsc` receiver. The task reconnects after a fixed delay until
//! [`RealtimeHandle::disconnect`] is called or every handle is dropped.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use staymate_config::{ConfigError, StaymateConfig};
use staymate_types::{AccessToken, UserId};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use url::Url;

use crate::events::{RealtimeEvent, SUBSCRIPTIONS, decode_event};
use crate::frame::{Command, Frame, FrameDecoder, Incoming};

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("real-time connection is not established")]
    NotConnected,
    #[error("real-time client has stopped")]
    Closed,
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub ws_url: Url,
    pub reconnect_delay: Duration,
    /// Zero disables sending heart-beats.
    pub heartbeat_outgoing: Duration,
    /// Zero disables the liveness check.
    pub heartbeat_incoming: Duration,
}

impl RealtimeConfig {
    pub fn from_config(config: &StaymateConfig) -> Result<Self, ConfigError> {
        let settings = config.realtime;
        Ok(Self {
            ws_url: config.ws_url()?,
            reconnect_delay: Duration::from_millis(settings.reconnect_delay_ms),
            heartbeat_outgoing: Duration::from_millis(settings.heartbeat_outgoing_ms),
            heartbeat_incoming: Duration::from_millis(settings.heartbeat_incoming_ms),
        })
    }
}

/// Supplies the access token for each connect attempt.
pub trait TokenSource: Send + Sync + 'static {
    fn access_token(&self) -> Option<AccessToken>;
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<AccessToken> + Send + Sync + 'static,
{
    fn access_token(&self) -> Option<AccessToken> {
        self()
    }
}

enum HandleCommand {
    Publish {
        destination: String,
        body: String,
        reply: oneshot::Sender<Result<(), RealtimeError>>,
    },
    Disconnect,
}

#[derive(Debug, Clone)]
pub struct RealtimeHandle {
    commands: mpsc::Sender<HandleCommand>,
    connected: Arc<AtomicBool>,
}

impl RealtimeHandle {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Send `payload` as JSON to `destination`.
    pub async fn publish(
        &self,
        destination: &str,
        payload: &impl Serialize,
    ) -> Result<(), RealtimeError> {
        if !self.is_connected() {
            return Err(RealtimeError::NotConnected);
        }
        let body = serde_json::to_string(payload)?;
        let (reply, response) = oneshot::channel();
        self.commands
            .send(HandleCommand::Publish {
                destination: destination.to_string(),
                body,
                reply,
            })
            .await
            .map_err(|_| RealtimeError::Closed)?;
        response.await.map_err(|_| RealtimeError::Closed)?
    }

    /// Send `DISCONNECT` and stop reconnecting.
    pub async fn disconnect(&self) {
        if self.commands.send(HandleCommand::Disconnect).await.is_err() {
            tracing::debug!("Real-time client already stopped");
        }
    }
}

pub struct RealtimeClient;

impl RealtimeClient {
    /// Start the connection task on the current tokio runtime.
    ///
    /// `user_id` only labels log output.
    pub fn spawn(
        config: RealtimeConfig,
        tokens: impl TokenSource,
        user_id: Option<UserId>,
    ) -> (RealtimeHandle, mpsc::Receiver<RealtimeEvent>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        let actor = Actor {
            config,
            tokens,
            user_id,
            commands: command_rx,
            events: event_tx,
            connected: Arc::clone(&connected),
        };
        tokio::spawn(actor.run());

        (
            RealtimeHandle {
                commands: command_tx,
                connected,
            },
            event_rx,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Reconnect,
    Stop,
}

/// Effective `(send, expect)` intervals from our `heart-beat` and the
/// broker's. `None` means disabled.
fn negotiate_heartbeat(
    outgoing: Duration,
    incoming: Duration,
    server: Option<&str>,
) -> (Option<Duration>, Option<Duration>) {
    let (server_send, server_expect) = server
        .and_then(|raw| raw.split_once(','))
        .and_then(|(sx, sy)| {
            Some((
                sx.trim().parse::<u64>().ok()?,
                sy.trim().parse::<u64>().ok()?,
            ))
        })
        .unwrap_or((0, 0));

    let pick = |ours: Duration, theirs_ms: u64| {
        (!ours.is_zero() && theirs_ms != 0).then(|| ours.max(Duration::from_millis(theirs_ms)))
    };
    (pick(outgoing, server_expect), pick(incoming, server_send))
}

async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Per-connection state. Dropped on disconnect, which clears subscriptions.
struct Link<S> {
    sink: S,
    subscriptions: HashSet<&'static str>,
    heartbeat: Option<Interval>,
    read_window: Option<Duration>,
}

impl<S> Link<S>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    async fn send(&mut self, frame: &Frame) -> Result<(), WsError> {
        let text = String::from_utf8_lossy(&frame.encode()).into_owned();
        self.sink.send(Message::text(text)).await
    }

    async fn subscribe_all(&mut self) -> Result<(), WsError> {
        for destination in SUBSCRIPTIONS {
            if !self.subscriptions.insert(destination) {
                continue;
            }
            let id = format!("sub-{}", self.subscriptions.len() - 1);
            let frame = Frame::new(Command::Subscribe)
                .header("id", id)
                .header("destination", destination)
                .header("ack", "auto");
            self.send(&frame).await?;
            tracing::debug!(destination, "Subscribed");
        }
        Ok(())
    }
}

struct Actor<T> {
    config: RealtimeConfig,
    tokens: T,
    user_id: Option<UserId>,
    commands: mpsc::Receiver<HandleCommand>,
    events: mpsc::Sender<RealtimeEvent>,
    connected: Arc<AtomicBool>,
}

impl<T: TokenSource> Actor<T> {
    async fn run(mut self) {
        loop {
            let end = self.session().await;
            if self.connected.swap(false, Ordering::AcqRel) {
                tracing::info!(user_id = ?self.user_id, "Real-time disconnected");
                self.emit(RealtimeEvent::Disconnected).await;
            }
            if end == SessionEnd::Stop || self.wait_before_reconnect().await == SessionEnd::Stop {
                break;
            }
        }
        tracing::debug!(user_id = ?self.user_id, "Real-time client stopped");
    }

    async fn emit(&self, event: RealtimeEvent) {
        if self.events.send(event).await.is_err() {
            tracing::trace!("Real-time event receiver dropped");
        }
    }

    async fn wait_before_reconnect(&mut self) -> SessionEnd {
        tracing::debug!(
            delay_ms = self.config.reconnect_delay.as_millis() as u64,
            "Scheduling real-time reconnect"
        );
        let sleep = tokio::time::sleep(self.config.reconnect_delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => return SessionEnd::Reconnect,
                command = self.commands.recv() => match command {
                    None | Some(HandleCommand::Disconnect) => return SessionEnd::Stop,
                    Some(HandleCommand::Publish { reply, .. }) => {
                        let _ = reply.send(Err(RealtimeError::NotConnected));
                    }
                },
            }
        }
    }

    async fn session(&mut self) -> SessionEnd {
        let Some(token) = self.tokens.access_token() else {
            tracing::warn!("No access token; real-time connect skipped");
            self.emit(RealtimeEvent::Error("not authenticated".into())).await;
            return SessionEnd::Reconnect;
        };

        let url = self.config.ws_url.as_str();
        let socket = match tokio_tungstenite::connect_async(url).await {
            Ok((socket, _)) => socket,
            Err(e) => {
                tracing::warn!(url, "Real-time connect failed: {e}");
                self.emit(RealtimeEvent::Error(format!("connect failed: {e}")))
                    .await;
                return SessionEnd::Reconnect;
            }
        };
        let (sink, mut stream) = socket.split();
        let mut link = Link {
            sink,
            subscriptions: HashSet::new(),
            heartbeat: None,
            read_window: None,
        };

        let connect = Frame::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("host", self.config.ws_url.host_str().unwrap_or("localhost"))
            .header(
                "heart-beat",
                format!(
                    "{},{}",
                    self.config.heartbeat_outgoing.as_millis(),
                    self.config.heartbeat_incoming.as_millis()
                ),
            )
            .header("Authorization", token.bearer());
        if let Err(e) = link.send(&connect).await {
            tracing::warn!("Failed to send CONNECT: {e}");
            return SessionEnd::Reconnect;
        }

        let mut decoder = FrameDecoder::new();
        let mut last_read = Instant::now();

        loop {
            tokio::select! {
                incoming = stream.next() => {
                    let bytes = match incoming {
                        Some(Ok(Message::Text(text))) => text.as_str().as_bytes().to_vec(),
                        Some(Ok(Message::Binary(data))) => data.to_vec(),
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!("Broker closed the connection");
                            return SessionEnd::Reconnect;
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            tracing::warn!("Real-time read failed: {e}");
                            return SessionEnd::Reconnect;
                        }
                    };
                    last_read = Instant::now();
                    decoder.push(&bytes);
                    loop {
                        match decoder.next_frame() {
                            Ok(None) => break,
                            Ok(Some(Incoming::Heartbeat)) => tracing::trace!("Heart-beat"),
                            Ok(Some(Incoming::Frame(frame))) => {
                                if let Err(e) = self.on_frame(frame, &mut link).await {
                                    tracing::warn!("Real-time write failed: {e}");
                                    return SessionEnd::Reconnect;
                                }
                            }
                            Err(e) => {
                                tracing::warn!("Malformed STOMP frame: {e}");
                                self.emit(RealtimeEvent::Error(e.to_string())).await;
                                return SessionEnd::Reconnect;
                            }
                        }
                    }
                }
                command = self.commands.recv() => match command {
                    None | Some(HandleCommand::Disconnect) => {
                        if let Err(e) = link.send(&Frame::new(Command::Disconnect)).await {
                            tracing::debug!("Failed to send DISCONNECT: {e}");
                        }
                        let _ = link.sink.close().await;
                        return SessionEnd::Stop;
                    }
                    Some(HandleCommand::Publish { destination, body, reply }) => {
                        if !self.connected.load(Ordering::Acquire) {
                            let _ = reply.send(Err(RealtimeError::NotConnected));
                            continue;
                        }
                        let frame = Frame::new(Command::Send)
                            .header("destination", destination)
                            .header("content-type", "application/json")
                            .body(body);
                        match link.send(&frame).await {
                            Ok(()) => {
                                let _ = reply.send(Ok(()));
                            }
                            Err(e) => {
                                tracing::warn!("Real-time publish failed: {e}");
                                let _ = reply.send(Err(RealtimeError::NotConnected));
                                return SessionEnd::Reconnect;
                            }
                        }
                    }
                },
                () = tick(link.heartbeat.as_mut()) => {
                    if let Err(e) = link.sink.send(Message::text("\n".to_string())).await {
                        tracing::warn!("Heart-beat send failed: {e}");
                        return SessionEnd::Reconnect;
                    }
                }
                () = deadline(link.read_window.map(|window| last_read + window)) => {
                    tracing::warn!("Broker went silent; reconnecting");
                    return SessionEnd::Reconnect;
                }
            }
        }
    }

    async fn on_frame<S>(&mut self, frame: Frame, link: &mut Link<S>) -> Result<(), WsError>
    where
        S: Sink<Message, Error = WsError> + Unpin,
    {
        match frame.command {
            Command::Connected => {
                let (send_every, expect_every) = negotiate_heartbeat(
                    self.config.heartbeat_outgoing,
                    self.config.heartbeat_incoming,
                    frame.get("heart-beat"),
                );
                link.heartbeat = send_every.map(|period| {
                    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    interval
                });
                link.read_window = expect_every.map(|period| period * 2);
                self.connected.store(true, Ordering::Release);
                tracing::info!(
                    user_id = ?self.user_id,
                    version = frame.get("version").unwrap_or("?"),
                    "Real-time connected"
                );
                self.emit(RealtimeEvent::Connected).await;
                link.subscribe_all().await?;
            }
            Command::Message => {
                let destination = frame.get("destination").unwrap_or_default();
                let Some(body) = frame.body_text() else {
                    tracing::warn!(destination, "Skipping non-UTF-8 message body");
                    return Ok(());
                };
                match decode_event(destination, body) {
                    Ok(event) => self.emit(event).await,
                    Err(e) => tracing::warn!("Skipping real-time message: {e}"),
                }
            }
            Command::Error => {
                let message = frame
                    .get("message")
                    .map(str::to_string)
                    .or_else(|| frame.body_text().map(str::to_string))
                    .unwrap_or_else(|| "broker error".to_string());
                tracing::warn!("Broker ERROR: {message}");
                self.emit(RealtimeEvent::Error(message)).await;
            }
            Command::Receipt => {
                tracing::debug!(receipt = frame.get("receipt-id"), "Receipt");
            }
            other => tracing::debug!(command = %other, "Ignoring unexpected frame"),
        }
        Ok(())
    }
}
