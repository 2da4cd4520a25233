//! Connection handle, builder and driver task.
//!
//! The [`ConnectionBuilder`] provides a fluent API for configuring timeouts
//! and delays. Building spawns a driver task that owns the socket, receive
//! buffer, heartbeat and reconnect timers, and the [`CommandQueue`]. The
//! [`Connection`] handle talks to the driver over a channel:
//!
//! ```text
//! Connection ─┐                          ┌─► TCP socket
//! Connection ─┼─► mpsc::Sender<Request> ─► Driver task
//! Connection ─┘                          └─► broadcast::Sender<ConnectionEvent>
//! ```
//!
//! Lifecycle:
//! 1. `connect()` opens the socket; on success the heartbeat starts
//! 2. Requests are written one at a time and matched to replies
//! 3. Frames arriving with nothing in flight are published as status events
//! 4. An unexpected close drains the queue and schedules a reconnect with
//!    exponential backoff; `disconnect()` closes without reconnecting
//!
//! # Example
//!
//! ```ignore
//! use arcam_client::{Connection, protocol::{zone, command}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let avr = Connection::builder("192.168.1.40").build()?;
//!     let mut events = avr.subscribe();
//!
//!     avr.connect().await?;
//!     let volume = avr.query(zone::MASTER, command::VOLUME).await?;
//!     println!("volume: {:?}", volume.value());
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};

use crate::config::ConnectionConfig;
use crate::error::{ArcamError, Result};
use crate::protocol::{
    command, encode_command, encode_query, encode_remote_command, rc5, zone, Frame, FrameBuffer,
};
use crate::queue::{CommandQueue, ReplySender};
use crate::transport::{self, ConnectFuture};

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Capacity of the request channel into the driver.
const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// Size of a single socket read.
const READ_CHUNK: usize = 512;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out the backoff delay before the next connect attempt.
    Reconnecting,
}

/// Notification published by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The socket is open.
    Connected,
    /// An open socket was closed.
    Disconnected,
    /// A socket-level failure; the connection may close afterwards.
    Error(String),
    /// A reconnect attempt is scheduled after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
    /// A frame the receiver pushed without being asked.
    Status(Frame),
}

/// A request sent from the handle to the driver task.
enum Request {
    Connect { reply: oneshot::Sender<Result<()>> },
    Disconnect { reply: oneshot::Sender<()> },
    Submit { bytes: Bytes, reply: ReplySender },
}

/// Builder for configuring and creating a [`Connection`].
pub struct ConnectionBuilder {
    config: ConnectionConfig,
    event_capacity: usize,
}

impl ConnectionBuilder {
    /// Create a builder for the receiver at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self::from_config(ConnectionConfig::new(host))
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ConnectionConfig) -> Self {
        Self {
            config,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Set the TCP port.
    ///
    /// Default: 50000
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the TCP connect timeout.
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set how long a command may wait for its reply, counted from submission.
    ///
    /// Default: 5 seconds
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    /// Set the interval between liveness queries.
    ///
    /// Default: 30 seconds
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    /// Set the reconnect backoff bounds.
    ///
    /// Default: 3 seconds doubling up to 60 seconds
    pub fn reconnect_delay(mut self, base: Duration, max: Duration) -> Self {
        self.config.reconnect_base_delay = base;
        self.config.reconnect_max_delay = max;
        self
    }

    /// Set the pause between a reply and the next write.
    ///
    /// Default: 50 milliseconds
    pub fn command_gap(mut self, gap: Duration) -> Self {
        self.config.command_gap = gap;
        self
    }

    /// Set the event channel capacity. Slow subscribers lag past this.
    ///
    /// Default: 64
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Validate the configuration and spawn the connection driver.
    ///
    /// Must be called from within a tokio runtime. The connection starts
    /// out disconnected.
    pub fn build(self) -> Result<Connection> {
        self.config.validate()?;
        Ok(Connection::spawn(self.config, self.event_capacity))
    }
}

/// Handle to a receiver connection.
///
/// Cheap to clone; all clones drive the same connection. When the last
/// clone is dropped the driver disconnects and exits.
#[derive(Clone)]
pub struct Connection {
    tx: mpsc::Sender<Request>,
    events: broadcast::Sender<ConnectionEvent>,
    state: watch::Receiver<ConnectionState>,
    config: Arc<ConnectionConfig>,
}

impl Connection {
    /// Create a connection builder for the receiver at `host`.
    pub fn builder(host: impl Into<String>) -> ConnectionBuilder {
        ConnectionBuilder::new(host)
    }

    /// Create a connection from a configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        ConnectionBuilder::from_config(config).build()
    }

    fn spawn(config: ConnectionConfig, event_capacity: usize) -> Self {
        let config = Arc::new(config);
        let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
        let (events, _) = broadcast::channel(event_capacity);
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);

        let driver = Driver::new(config.clone(), rx, events.clone(), state_tx);
        tokio::spawn(driver.run());

        Self {
            tx,
            events,
            state,
            config,
        }
    }

    /// The configuration this connection was built with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Subscribe to lifecycle and status events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Check if the socket is open.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Wait until the connection reaches `state`.
    pub async fn wait_for_state(&self, state: ConnectionState) -> Result<()> {
        let mut rx = self.state.clone();
        rx.wait_for(|current| *current == state)
            .await
            .map(|_| ())
            .map_err(|_| ArcamError::ConnectionClosed)
    }

    /// Open the connection.
    ///
    /// Resolves once the socket is connected, or fails with the connect
    /// error. A failed attempt still schedules a reconnect; call
    /// [`disconnect`](Self::disconnect) to stop retrying.
    pub async fn connect(&self) -> Result<()> {
        self.request(|reply| Request::Connect { reply }).await?
    }

    /// Close the connection without reconnecting.
    ///
    /// Every outstanding command is rejected with [`ArcamError::Disconnected`].
    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| Request::Disconnect { reply }).await
    }

    /// Write `data` to a register and wait for the receiver's answer.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than 255 bytes.
    pub async fn send_command(&self, zone: u8, command: u8, data: &[u8]) -> Result<Frame> {
        self.enqueue(encode_command(zone, command, data)).await
    }

    /// Ask for the current value of a register.
    pub async fn query(&self, zone: u8, command: u8) -> Result<Frame> {
        self.enqueue(encode_query(zone, command)).await
    }

    /// Relay an RC5 remote-control code.
    pub async fn send_rc5(&self, zone: u8, system: u8, code: u8) -> Result<Frame> {
        self.enqueue(encode_remote_command(zone, system, code)).await
    }

    /// Toggle mute in `zone` via its RC5 mute code.
    pub async fn toggle_mute(&self, zone: u8) -> Result<Frame> {
        let (system, code) = rc5::mute_toggle(zone);
        self.send_rc5(zone, system, code).await
    }

    /// One-shot reachability probe.
    ///
    /// Connects, queries the heartbeat register and disconnects again,
    /// whatever the outcome. All failures collapse to `false`.
    pub async fn test_connection(&self) -> bool {
        let reachable = match self.connect().await {
            Ok(()) => match self.query(zone::MASTER, command::HEARTBEAT).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(error = %e, "Connection test query failed");
                    false
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "Connection test connect failed");
                false
            }
        };

        let _ = self.disconnect().await;
        reachable
    }

    /// Submit encoded bytes to the command queue and wait for the reply.
    async fn enqueue(&self, bytes: Bytes) -> Result<Frame> {
        self.request(|reply| Request::Submit { bytes, reply }).await?
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ArcamError::ConnectionClosed)?;
        reply_rx.await.map_err(|_| ArcamError::ConnectionClosed)
    }
}

/// Owns every piece of mutable connection state. Runs as one spawned task.
struct Driver {
    config: Arc<ConnectionConfig>,
    rx: mpsc::Receiver<Request>,
    events: broadcast::Sender<ConnectionEvent>,
    state: watch::Sender<ConnectionState>,
    reader: Option<OwnedReadHalf>,
    writer: Option<OwnedWriteHalf>,
    connecting: Option<ConnectFuture>,
    connect_waiters: Vec<oneshot::Sender<Result<()>>>,
    frames: FrameBuffer,
    queue: CommandQueue,
    next_heartbeat: Option<Instant>,
    reconnect_at: Option<Instant>,
    attempts: u32,
    /// Set by `disconnect()`; suppresses reconnection.
    intentional: bool,
}

impl Driver {
    fn new(
        config: Arc<ConnectionConfig>,
        rx: mpsc::Receiver<Request>,
        events: broadcast::Sender<ConnectionEvent>,
        state: watch::Sender<ConnectionState>,
    ) -> Self {
        let queue = CommandQueue::new(config.command_timeout, config.command_gap);
        Self {
            config,
            rx,
            events,
            state,
            reader: None,
            writer: None,
            connecting: None,
            connect_waiters: Vec::new(),
            frames: FrameBuffer::new(),
            queue,
            next_heartbeat: None,
            reconnect_at: None,
            attempts: 0,
            intentional: false,
        }
    }

    /// Main loop. Every handler runs to completion before the next event is
    /// looked at, so no two handlers ever touch the queue or buffer at once.
    async fn run(mut self) {
        let mut read_buf = vec![0u8; READ_CHUNK];

        loop {
            self.flush_queue().await;

            // The post-reply gap only matters while there is a socket to write to.
            let ready_at = self.writer.as_ref().and(self.queue.ready_at());
            let queue_timer = earliest(self.queue.next_deadline(), ready_at);

            tokio::select! {
                request = self.rx.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => {
                        tracing::debug!("All connection handles dropped, shutting down");
                        break;
                    }
                },

                result = wait_connect(&mut self.connecting) => self.on_connect_result(result),

                read = read_some(&mut self.reader, &mut read_buf) => self.on_read(read, &read_buf),

                _ = sleep_until_opt(queue_timer) => {
                    self.queue.expire(Instant::now());
                }

                _ = sleep_until_opt(self.next_heartbeat) => self.send_heartbeat(),

                _ = sleep_until_opt(self.reconnect_at) => {
                    self.reconnect_at = None;
                    tracing::debug!(attempt = self.attempts, "Reconnecting");
                    self.begin_connect();
                }
            }
        }

        self.close().await;
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Connect { reply } => {
                self.intentional = false;
                self.reconnect_at = None;
                self.connect_waiters.push(reply);
                self.begin_connect();
            }
            Request::Disconnect { reply } => {
                self.close().await;
                let _ = reply.send(());
            }
            Request::Submit { bytes, reply } => {
                self.queue.push(bytes, reply, Instant::now());
            }
        }
    }

    /// Start a connect attempt unless one is running or the socket is open.
    fn begin_connect(&mut self) {
        if self.writer.is_some() {
            self.notify_waiters(|| Ok(()));
            return;
        }
        if self.connecting.is_some() {
            return;
        }

        self.set_state(ConnectionState::Connecting);
        self.connecting = Some(transport::connect(
            self.config.host.clone(),
            self.config.port,
            self.config.connect_timeout,
        ));
    }

    fn on_connect_result(&mut self, result: Result<TcpStream>) {
        match result {
            Ok(stream) => {
                let (reader, writer) = stream.into_split();
                self.reader = Some(reader);
                self.writer = Some(writer);
                self.frames.clear();
                self.attempts = 0;
                self.next_heartbeat = Some(Instant::now() + self.config.heartbeat_interval);
                self.set_state(ConnectionState::Connected);

                tracing::debug!(
                    host = %self.config.host,
                    port = self.config.port,
                    "Connected to receiver"
                );
                self.emit(ConnectionEvent::Connected);
                self.notify_waiters(|| Ok(()));
            }
            Err(error) => {
                tracing::debug!(error = %error, "Connect attempt failed");
                self.emit(ConnectionEvent::Error(error.to_string()));
                self.notify_waiters(|| Err(error.duplicate()));
                self.on_closed();
            }
        }
    }

    fn on_read(&mut self, read: std::io::Result<usize>, buf: &[u8]) {
        match read {
            Ok(0) => {
                tracing::debug!("Receiver closed the connection");
                self.on_closed();
            }
            Ok(n) => {
                tracing::trace!(bytes = ?&buf[..n], "Received");
                let now = Instant::now();
                for frame in self.frames.push(&buf[..n]) {
                    if let Some(status) = self.queue.resolve(frame, now) {
                        tracing::trace!(
                            zone = status.zone,
                            command = status.command,
                            "Unsolicited status"
                        );
                        self.emit(ConnectionEvent::Status(status));
                    }
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "Socket read failed");
                self.emit(ConnectionEvent::Error(error.to_string()));
                self.on_closed();
            }
        }
    }

    /// Write the next queued request if the socket is idle.
    async fn flush_queue(&mut self) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        while let Some(bytes) = self.queue.promote(Instant::now()) {
            match writer.write_all(&bytes).await {
                Ok(()) => {
                    tracing::trace!(bytes = ?&bytes[..], "Sent");
                    break;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Socket write failed");
                    self.queue.write_failed(ArcamError::Io(error));
                }
            }
        }
    }

    /// Queue a liveness query. Its outcome is only logged: a dead link shows
    /// up as a socket close, which drives reconnection.
    fn send_heartbeat(&mut self) {
        let now = Instant::now();
        self.next_heartbeat = Some(now + self.config.heartbeat_interval);

        let (reply_tx, reply_rx) = oneshot::channel();
        self.queue
            .push(encode_query(zone::MASTER, command::HEARTBEAT), reply_tx, now);

        tokio::spawn(async move {
            match reply_rx.await {
                Ok(Ok(_)) => tracing::trace!("Heartbeat acknowledged"),
                Ok(Err(e)) => tracing::debug!(error = %e, "Heartbeat failed"),
                Err(_) => {}
            }
        });
    }

    /// Caller-initiated close: stop timers and reconnects, then close.
    ///
    /// Ends the session, so the next one backs off from the base delay again.
    async fn close(&mut self) {
        self.intentional = true;
        self.reconnect_at = None;
        self.attempts = 0;
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                tracing::trace!(error = %e, "Socket shutdown failed");
            }
        }
        self.on_closed();
    }

    /// The socket is gone, or a connect attempt failed.
    fn on_closed(&mut self) {
        let was_connected = *self.state.borrow() == ConnectionState::Connected;

        self.reader = None;
        self.writer = None;
        self.connecting = None;
        self.frames.clear();
        self.next_heartbeat = None;
        self.queue.drain();
        self.notify_waiters(|| Err(ArcamError::Disconnected));
        self.set_state(ConnectionState::Disconnected);

        if was_connected {
            tracing::debug!("Disconnected from receiver");
            self.emit(ConnectionEvent::Disconnected);
        }

        if !self.intentional {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
        let delay = self.config.reconnect_delay(self.attempts);
        self.reconnect_at = Some(Instant::now() + delay);
        self.set_state(ConnectionState::Reconnecting);

        tracing::debug!(attempt = self.attempts, ?delay, "Scheduling reconnect");
        self.emit(ConnectionEvent::Reconnecting {
            attempt: self.attempts,
            delay,
        });
    }

    fn notify_waiters(&mut self, result: impl Fn() -> Result<()>) {
        for waiter in self.connect_waiters.drain(..) {
            let _ = waiter.send(result());
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    fn emit(&self, event: ConnectionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

async fn wait_connect(slot: &mut Option<ConnectFuture>) -> Result<TcpStream> {
    match slot.as_mut() {
        Some(fut) => {
            let result = fut.await;
            *slot = None;
            result
        }
        None => pending().await,
    }
}

async fn read_some(reader: &mut Option<OwnedReadHalf>, buf: &mut [u8]) -> std::io::Result<usize> {
    match reader.as_mut() {
        Some(reader) => reader.read(buf).await,
        None => pending().await,
    }
}

async fn sleep_until_opt(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_configuration() {
        let builder = Connection::builder("avr.local")
            .port(50001)
            .connect_timeout(Duration::from_secs(2))
            .command_timeout(Duration::from_secs(1))
            .heartbeat_interval(Duration::from_secs(10))
            .reconnect_delay(Duration::from_millis(500), Duration::from_secs(8))
            .command_gap(Duration::from_millis(20))
            .event_capacity(0);

        assert_eq!(builder.config.host, "avr.local");
        assert_eq!(builder.config.port, 50001);
        assert_eq!(builder.config.connect_timeout, Duration::from_secs(2));
        assert_eq!(builder.config.command_timeout, Duration::from_secs(1));
        assert_eq!(builder.config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(builder.config.reconnect_base_delay, Duration::from_millis(500));
        assert_eq!(builder.config.reconnect_max_delay, Duration::from_secs(8));
        assert_eq!(builder.config.command_gap, Duration::from_millis(20));
        assert_eq!(builder.event_capacity, 1);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let result = Connection::builder("")
            .reconnect_delay(Duration::from_secs(10), Duration::from_secs(1))
            .build();
        assert!(matches!(result, Err(ArcamError::Config(_))));
    }

    #[tokio::test]
    async fn test_new_connection_is_disconnected() {
        let conn = Connection::builder("127.0.0.1").build().unwrap();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
        assert_eq!(conn.config().port, 50000);
    }

    #[tokio::test]
    async fn test_disconnect_when_idle() {
        let conn = Connection::builder("127.0.0.1").build().unwrap();
        let mut events = conn.subscribe();

        conn.disconnect().await.unwrap();

        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_commands_wait_while_disconnected() {
        let conn = Connection::builder("127.0.0.1")
            .command_timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        let err = conn.query(zone::MASTER, command::POWER).await.unwrap_err();
        assert!(matches!(err, ArcamError::CommandTimeout(_)));
    }

    #[test]
    fn test_earliest() {
        let now = Instant::now();
        let later = now + Duration::from_secs(1);
        assert_eq!(earliest(Some(later), Some(now)), Some(now));
        assert_eq!(earliest(None, Some(later)), Some(later));
        assert_eq!(earliest(None, None), None);
    }
}
