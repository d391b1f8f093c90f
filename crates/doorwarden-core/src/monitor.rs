// ── Monitor ──
//
// Transport selection and lifecycle for real-time dashboard updates.
// Exactly one delivery mode is active at a time: the WebSocket push
// channel when it is up, the polling loop otherwise. Both feed the same
// apply loop, so the reconciler never knows which transport produced a
// snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use doorwarden_api::{DashboardClient, PushChannel, StatusSnapshot};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::reconcile::{Reconciler, ViewSink};
use crate::sequence::{AdmitAll, SequencingPolicy, Source};

const SNAPSHOT_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────────

/// Delivery state observable by consumers and mirrored to the sink badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No push channel; reconnect attempts may still be pending.
    Disconnected,
    /// Push handshake in progress.
    Connecting,
    /// Push channel live; polling suspended.
    Connected,
    /// Push retries exhausted. Polling is the sole transport until
    /// [`Monitor::reset_push`].
    PollingFallback,
}

/// Point-in-time transport report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportStatus {
    pub state: ConnectionState,
    pub polling_active: bool,
    pub push_retries: u32,
}

// ── Monitor ──────────────────────────────────────────────────────────

/// The real-time update manager, owned by the hosting application.
///
/// Cheaply cloneable via `Arc`. Construct with [`new`](Self::new), then
/// drive the lifecycle with [`start`](Self::start) / [`stop`](Self::stop).
/// All background work runs under cancellation tokens, so `stop` is
/// guaranteed to prevent any further tick or callback.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    sink: Arc<dyn ViewSink>,
    connection_state: watch::Sender<ConnectionState>,
    /// Both transports feed snapshots through this channel into the apply
    /// loop -- recreated on stop so a restart gets a fresh receiver.
    snapshot_tx: Mutex<mpsc::Sender<(Source, StatusSnapshot)>>,
    snapshot_rx: Mutex<Option<mpsc::Receiver<(Source, StatusSnapshot)>>>,
    policy: Mutex<Box<dyn SequencingPolicy>>,
    client: Mutex<Option<DashboardClient>>,
    cancel: CancellationToken,
    /// Child token for the current run -- cancelled on stop, replaced on
    /// the next start (avoids permanent cancellation).
    cancel_child: Mutex<CancellationToken>,
    poll_handle: Mutex<Option<PollHandle>>,
    push_handle: Mutex<Option<JoinHandle<()>>>,
    apply_handle: Mutex<Option<JoinHandle<()>>>,
    push_retries: AtomicU32,
    started: Mutex<bool>,
}

struct PollHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Monitor {
    /// Create a monitor with the default sequencing policy. Does NOT start
    /// any transport -- call [`start()`](Self::start).
    pub fn new(config: MonitorConfig, sink: Arc<dyn ViewSink>) -> Self {
        Self::with_policy(config, sink, Box::new(AdmitAll))
    }

    /// Create a monitor with a custom cross-transport sequencing policy.
    pub fn with_policy(
        config: MonitorConfig,
        sink: Arc<dyn ViewSink>,
        policy: Box<dyn SequencingPolicy>,
    ) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(SNAPSHOT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(MonitorInner {
                config,
                sink,
                connection_state,
                snapshot_tx: Mutex::new(snapshot_tx),
                snapshot_rx: Mutex::new(Some(snapshot_rx)),
                policy: Mutex::new(policy),
                client: Mutex::new(None),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                poll_handle: Mutex::new(None),
                push_handle: Mutex::new(None),
                apply_handle: Mutex::new(None),
                push_retries: AtomicU32::new(0),
                started: Mutex::new(false),
            }),
        }
    }

    /// Access the monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start delivery. Idempotent.
    ///
    /// The polling loop starts immediately as a safety net (one fetch right
    /// away, then at the fixed interval) while the push handshake runs
    /// concurrently; a successful handshake suspends polling.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut started = self.inner.started.lock().await;
        if *started {
            debug!("monitor already started");
            return Ok(());
        }

        // Resolve everything fallible before spawning anything.
        let transport = self.inner.config.transport();
        let client = DashboardClient::new(&self.inner.config.url, &transport)?;
        let events_url = if self.inner.config.websocket_enabled {
            Some(self.inner.config.events_url()?)
        } else {
            None
        };

        *self.inner.client.lock().await = Some(client.clone());

        // Fresh child token for this run (supports restart after stop).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        set_state(&self.inner, ConnectionState::Connecting);

        // Apply loop -- the single consumer touching reconciler state.
        if let Some(rx) = self.inner.snapshot_rx.lock().await.take() {
            let reconciler = Reconciler::new(Arc::clone(&self.inner.sink));
            let inner = Arc::clone(&self.inner);
            *self.inner.apply_handle.lock().await =
                Some(tokio::spawn(apply_task(inner, rx, reconciler, child.clone())));
        }

        // Polling safety net -- runs until the push channel confirms.
        start_polling(&self.inner, client.clone(), &child).await;

        match events_url {
            Some(events_url) => {
                let inner = Arc::clone(&self.inner);
                *self.inner.push_handle.lock().await =
                    Some(tokio::spawn(push_task(inner, events_url, child.clone())));
            }
            None => {
                debug!("push channel disabled, polling only");
                set_state(&self.inner, ConnectionState::PollingFallback);
            }
        }

        *started = true;
        info!("monitor started");
        Ok(())
    }

    /// Stop delivery and release every timer and channel handle. Idempotent.
    ///
    /// After this returns, no further poll tick, push frame, or sink call
    /// will be made until the next [`start()`](Self::start).
    pub async fn stop(&self) {
        let mut started = self.inner.started.lock().await;
        if !*started {
            debug!("monitor not running");
            return;
        }

        self.inner.cancel_child.lock().await.cancel();

        if let Some(handle) = self.inner.push_handle.lock().await.take() {
            let _ = handle.await;
        }
        if let Some(poll) = self.inner.poll_handle.lock().await.take() {
            poll.cancel.cancel();
            let _ = poll.handle.await;
        }
        if let Some(handle) = self.inner.apply_handle.lock().await.take() {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;
        self.inner.push_retries.store(0, Ordering::Relaxed);

        // Recreate the snapshot channel so a restart spawns a fresh apply loop.
        {
            let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_SIZE);
            *self.inner.snapshot_tx.lock().await = tx;
            *self.inner.snapshot_rx.lock().await = Some(rx);
        }

        set_state(&self.inner, ConnectionState::Disconnected);
        *started = false;
        info!("monitor stopped");
    }

    /// Re-arm the push handshake with a fresh retry budget -- the external
    /// reset out of [`ConnectionState::PollingFallback`].
    pub async fn reset_push(&self) -> Result<(), CoreError> {
        let running = *self.inner.started.lock().await;
        if !running {
            return Err(CoreError::NotRunning);
        }
        if !self.inner.config.websocket_enabled {
            return Err(CoreError::Config {
                message: "push channel is disabled in the configuration".into(),
            });
        }

        let mut guard = self.inner.push_handle.lock().await;
        if guard.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("push supervisor still active, nothing to reset");
            return Ok(());
        }

        let events_url = self.inner.config.events_url()?;
        let child = self.inner.cancel_child.lock().await.clone();
        self.inner.push_retries.store(0, Ordering::Relaxed);

        info!("re-arming push channel");
        let inner = Arc::clone(&self.inner);
        *guard = Some(tokio::spawn(push_task(inner, events_url, child)));
        Ok(())
    }

    /// Fetch a snapshot right now and feed it through the normal
    /// reconciliation path (the manual refresh button).
    pub async fn refresh_now(&self) -> Result<(), CoreError> {
        let client = self
            .inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotRunning)?;

        let snapshot = client.fetch_snapshot().await?;

        let tx = self.inner.snapshot_tx.lock().await.clone();
        tx.send((Source::Poll, snapshot))
            .await
            .map_err(|_| CoreError::NotRunning)
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// Fetch a single snapshot without starting any transport.
    ///
    /// For CLI-style single request-response cycles; no polling loop, no
    /// push channel, nothing to stop afterwards.
    pub async fn fetch_once(config: &MonitorConfig) -> Result<StatusSnapshot, CoreError> {
        let client = DashboardClient::new(&config.url, &config.transport())?;
        client.fetch_snapshot().await.map_err(|e| match e {
            doorwarden_api::Error::Transport(ref t) if t.is_connect() || t.is_timeout() => {
                CoreError::ConnectionFailed {
                    url: config.url.to_string(),
                    reason: e.to_string(),
                }
            }
            other => other.into(),
        })
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Current transport status (the debugging surface).
    pub async fn status(&self) -> TransportStatus {
        TransportStatus {
            state: *self.inner.connection_state.borrow(),
            polling_active: self.inner.poll_handle.lock().await.is_some(),
            push_retries: self.inner.push_retries.load(Ordering::Relaxed),
        }
    }
}

// ── State helper ─────────────────────────────────────────────────────

fn set_state(inner: &MonitorInner, state: ConnectionState) {
    let _ = inner.connection_state.send(state);
    inner.sink.set_connection_badge(state);
}

// ── Polling loop ─────────────────────────────────────────────────────

/// Spawn the polling loop if it is not already running.
async fn start_polling(inner: &Arc<MonitorInner>, client: DashboardClient, base: &CancellationToken) {
    let mut guard = inner.poll_handle.lock().await;
    if guard.is_some() {
        return;
    }

    info!("starting polling loop");
    let cancel = base.child_token();
    let task_inner = Arc::clone(inner);
    let handle = tokio::spawn(poll_task(task_inner, client, cancel.clone()));
    *guard = Some(PollHandle { cancel, handle });
}

/// Cancel and join the polling loop if it is running.
async fn stop_polling(inner: &Arc<MonitorInner>) {
    let taken = inner.poll_handle.lock().await.take();
    if let Some(poll) = taken {
        info!("stopping polling loop");
        poll.cancel.cancel();
        let _ = poll.handle.await;
    }
}

/// Fetch-and-forward at the fixed interval. The first tick fires
/// immediately, so polling starts with a fetch rather than a wait.
/// Fetch failures are logged and swallowed -- the next tick still fires.
async fn poll_task(inner: Arc<MonitorInner>, client: DashboardClient, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(inner.config.poll_interval);
    let snapshot_tx = inner.snapshot_tx.lock().await.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = client.fetch_snapshot() => match result {
                        Ok(snapshot) => {
                            let _ = snapshot_tx.send((Source::Poll, snapshot)).await;
                        }
                        Err(e) => {
                            warn!(error = %e, "poll fetch failed, retrying next tick");
                        }
                    }
                }
            }
        }
    }

    debug!("polling loop exited");
}

// ── Push supervisor ──────────────────────────────────────────────────

/// Connect → announce → stream; on failure, retry with a counted budget;
/// at the budget, fall back to polling permanently until re-armed.
async fn push_task(inner: Arc<MonitorInner>, events_url: Url, cancel: CancellationToken) {
    let mut retries: u32 = 0;
    let snapshot_tx = inner.snapshot_tx.lock().await.clone();

    'supervisor: loop {
        set_state(&inner, ConnectionState::Connecting);

        let connected = tokio::select! {
            biased;
            () = cancel.cancelled() => break 'supervisor,
            result = tokio::time::timeout(inner.config.timeout, PushChannel::connect(&events_url)) => {
                result.unwrap_or_else(|_| {
                    Err(doorwarden_api::Error::WebSocketConnect(format!(
                        "handshake timed out after {}s",
                        inner.config.timeout.as_secs()
                    )))
                })
            }
        };

        match connected {
            Ok(mut channel) => {
                retries = 0;
                inner.push_retries.store(0, Ordering::Relaxed);
                set_state(&inner, ConnectionState::Connected);
                stop_polling(&inner).await;

                if let Err(e) = channel.announce_ready(&inner.config.page).await {
                    // The stream read below will surface the dead socket.
                    warn!(error = %e, "client_ready send failed");
                }

                loop {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break 'supervisor,
                        result = channel.next_snapshot() => match result {
                            Ok(Some(snapshot)) => {
                                let _ = snapshot_tx.send((Source::Push, snapshot)).await;
                            }
                            Ok(None) => {
                                info!("push channel closed");
                                break;
                            }
                            Err(e) => {
                                warn!(error = %e, "push channel dropped");
                                break;
                            }
                        }
                    }
                }

                // Channel gone -- polling takes over while we retry.
                set_state(&inner, ConnectionState::Disconnected);
                resume_polling(&inner, &cancel).await;
            }
            Err(e) => {
                retries += 1;
                inner.push_retries.store(retries, Ordering::Relaxed);
                warn!(error = %e, attempt = retries, "push connect failed");

                if retries >= inner.config.max_retries {
                    info!(
                        max_retries = inner.config.max_retries,
                        "push retries exhausted, polling fallback until reset"
                    );
                    set_state(&inner, ConnectionState::PollingFallback);
                    resume_polling(&inner, &cancel).await;
                    break 'supervisor;
                }

                set_state(&inner, ConnectionState::Disconnected);

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break 'supervisor,
                    () = tokio::time::sleep(inner.config.retry_delay) => {}
                }
            }
        }
    }

    debug!("push supervisor exited");
}

/// Restart the polling loop after a push session ends. The client is the
/// one built on start; if it is gone the monitor is stopping anyway.
async fn resume_polling(inner: &Arc<MonitorInner>, cancel: &CancellationToken) {
    let client = inner.client.lock().await.clone();
    if let Some(client) = client {
        start_polling(inner, client, cancel).await;
    }
}

// ── Apply loop ───────────────────────────────────────────────────────

/// Single consumer for both transports: consults the sequencing policy,
/// then lets the reconciler diff the snapshot into sink calls. Snapshots
/// are processed strictly in arrival order.
async fn apply_task(
    inner: Arc<MonitorInner>,
    mut rx: mpsc::Receiver<(Source, StatusSnapshot)>,
    mut reconciler: Reconciler,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            received = rx.recv() => {
                let Some((source, snapshot)) = received else { break };
                let admitted = inner.policy.lock().await.admit(source, &snapshot);
                if admitted {
                    reconciler.apply(&snapshot);
                } else {
                    debug!(?source, "snapshot rejected by sequencing policy");
                }
            }
        }
    }

    debug!("apply loop exited");
}
