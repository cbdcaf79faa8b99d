//! Fixed-delay polling worker, generic over the platform strategy

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::authn::credentials::CredentialProvider;
use crate::models::deploy::PollSnapshot;
use crate::sources::{poll_once, DeploySource};

/// Receives every successfully produced snapshot
pub type SnapshotCallback = Arc<dyn Fn(PollSnapshot) + Send + Sync>;

/// Shared, replaceable callback registration
pub type CallbackSlot = Arc<RwLock<Option<SnapshotCallback>>>;

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between the end of one cycle and the start of the next
    pub interval: Duration,

    /// Initial delay before the first interval starts
    pub initial_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            initial_delay: Duration::ZERO,
        }
    }
}

/// Run one poll cycle and hand the snapshot to the registered callback.
///
/// Failures end the cycle without a callback; the previous snapshot stays in
/// place wherever the callback stores it. Returns whether a snapshot was
/// delivered.
pub async fn run_cycle<S>(
    source: &S,
    provider: &dyn CredentialProvider,
    callback: &CallbackSlot,
) -> bool
where
    S: DeploySource + ?Sized,
{
    let platform = source.platform();
    match poll_once(source, provider, Utc::now()).await {
        Ok(snapshot) => {
            debug!(
                "{} poll: {} deploy(s) in progress",
                platform,
                snapshot.len()
            );
            let callback = callback
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            match callback {
                Some(callback) => {
                    callback(snapshot);
                    true
                }
                None => {
                    debug!("{} poll finished with no callback registered", platform);
                    false
                }
            }
        }
        Err(e) if e.is_credential_error() => {
            warn!("{} credentials unavailable, skipping poll: {}", platform, e);
            false
        }
        Err(e) => {
            error!("Error polling {}: {}", platform, e);
            false
        }
    }
}

/// Run the poller loop until `shutdown_signal` resolves.
///
/// The signal is only observed while waiting between cycles, so a cycle that
/// has started always runs to completion, callback included.
pub async fn run<S, Sl, F>(
    options: &Options,
    source: &S,
    provider: &dyn CredentialProvider,
    callback: &CallbackSlot,
    sleep_fn: Sl,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: DeploySource + ?Sized,
    Sl: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let platform = source.platform();
    info!(
        "{} poller starting (every {:?})...",
        platform, options.interval
    );

    tokio::select! {
        _ = &mut shutdown_signal => {
            info!("{} poller shutting down...", platform);
            return;
        }
        _ = sleep_fn(options.initial_delay) => {}
    }

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("{} poller shutting down...", platform);
                return;
            }
            _ = sleep_fn(options.interval) => {
                // Continue with poll
            }
        }

        run_cycle(source, provider, callback).await;
    }
}

struct RunningPoller {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// A platform poller with a start/stop lifecycle
pub struct Poller<S: DeploySource + 'static> {
    source: Arc<S>,
    provider: Arc<dyn CredentialProvider>,
    options: Options,
    callback: CallbackSlot,
    running: Mutex<Option<RunningPoller>>,
    stopping: Mutex<Option<AbortHandle>>,
}

impl<S: DeploySource + 'static> Poller<S> {
    pub fn new(source: Arc<S>, provider: Arc<dyn CredentialProvider>, options: Options) -> Self {
        Self {
            source,
            provider,
            options,
            callback: Arc::new(RwLock::new(None)),
            running: Mutex::new(None),
            stopping: Mutex::new(None),
        }
    }

    /// Register the callback invoked after every successful cycle, replacing
    /// any earlier registration. Takes effect from the next cycle, even while
    /// running.
    pub fn set_callback<C>(&self, callback: C)
    where
        C: Fn(PollSnapshot) + Send + Sync + 'static,
    {
        let mut slot = self.callback.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(callback));
    }

    pub fn is_running(&self) -> bool {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running
            .as_ref()
            .map(|poller| !poller.handle.is_finished())
            .unwrap_or(false)
    }

    /// Begin polling. Returns whether a task was started: calling it while
    /// already running, or before a stopped task has finished its last cycle,
    /// only logs a warning.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let platform = self.source.platform();
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(poller) = running.as_ref() {
            if !poller.handle.is_finished() {
                warn!("{} poller is already running.", platform);
                return false;
            }
        }

        // Snapshots of one platform must arrive in poll order
        let mut stopping = self.stopping.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = stopping.as_ref() {
            if !previous.is_finished() {
                warn!("{} poller is still finishing its last cycle.", platform);
                return false;
            }
        }
        *stopping = None;

        info!("Starting {} poller...", platform);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let source = self.source.clone();
        let provider = self.provider.clone();
        let callback = self.callback.clone();
        let options = self.options.clone();

        let handle = tokio::spawn(async move {
            run(
                &options,
                source.as_ref(),
                provider.as_ref(),
                &callback,
                tokio::time::sleep,
                Box::pin(async move {
                    let _ = stop_rx.await;
                }),
            )
            .await;
        });

        *running = Some(RunningPoller { stop_tx, handle });
        true
    }

    /// Cancel future cycles. A cycle already in flight still completes and
    /// delivers its snapshot. Returns the task handle the first time so the
    /// caller can wait for it; later calls are no-ops returning `None`.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        let poller = running.take()?;
        let _ = poller.stop_tx.send(());
        let mut stopping = self.stopping.lock().unwrap_or_else(|e| e.into_inner());
        *stopping = Some(poller.handle.abort_handle());
        info!("{} poller stopped.", self.source.platform());
        Some(poller.handle)
    }
}
