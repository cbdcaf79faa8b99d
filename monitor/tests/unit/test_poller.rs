//! Poller lifecycle and cycle delivery tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_test::assert_ok;

use pzdeploys::authn::credentials::{CredentialKey, CredentialProvider};
use pzdeploys::models::deploy::{Platform, PollSnapshot};
use pzdeploys::sources::render::{RenderOptions, RenderSource};
use pzdeploys::sources::vercel::VercelSource;
use pzdeploys::workers::poller::{self, run_cycle, CallbackSlot, Poller};

use crate::common::*;

const WAIT: Duration = Duration::from_secs(5);

fn fast_options() -> poller::Options {
    poller::Options {
        interval: Duration::from_millis(10),
        initial_delay: Duration::ZERO,
    }
}

fn collecting_slot() -> (CallbackSlot, Arc<std::sync::Mutex<Vec<PollSnapshot>>>) {
    let received = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = received.clone();
    let slot: CallbackSlot = Arc::new(RwLock::new(Some(Arc::new(move |snapshot: PollSnapshot| {
        sink.lock().unwrap().push(snapshot);
    }))));
    (slot, received)
}

#[tokio::test]
async fn empty_result_is_still_delivered() {
    let source = VercelSource::new(Arc::new(FakeVercelApi::default()));
    let creds = all_credentials();
    let (slot, received) = collecting_slot();

    assert!(run_cycle(&source, &creds, &slot).await);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].platform, Platform::Vercel);
    assert!(received[0].is_empty());
}

#[tokio::test]
async fn missing_credentials_skip_the_callback() {
    let source = VercelSource::new(Arc::new(FakeVercelApi::default()));
    let creds = FakeCredentials::default();
    let (slot, received) = collecting_slot();

    assert!(!run_cycle(&source, &creds, &slot).await);
    assert!(received.lock().unwrap().is_empty());

    let corrupt = all_credentials();
    corrupt.corrupt(CredentialKey::VercelApiKey);
    assert!(!run_cycle(&source, &corrupt, &slot).await);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fetch_failure_skips_the_callback() {
    let api = Arc::new(FakeRenderApi::default());
    *api.fail_listing.lock().unwrap() = true;
    let source = RenderSource::new(api, RenderOptions::default());
    let creds = all_credentials();
    let (slot, received) = collecting_slot();

    assert!(!run_cycle(&source, &creds, &slot).await);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn run_stops_when_signalled_between_cycles() {
    let source = VercelSource::new(Arc::new(FakeVercelApi::default()));
    let creds = all_credentials();
    let (slot, received) = collecting_slot();
    let sleeps = Arc::new(AtomicUsize::new(0));

    let counter = sleeps.clone();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let stop = std::sync::Mutex::new(Some(stop_tx));

    // Every sleep returns at once; the third one asks the loop to stop
    let sleep_fn = move |_wait: Duration| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if n == 3 {
            if let Some(tx) = stop.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
        async move {
            if n >= 3 {
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::time::timeout(
        WAIT,
        poller::run(
            &fast_options(),
            &source,
            &creds,
            &slot,
            sleep_fn,
            Box::pin(async move {
                let _ = stop_rx.await;
            }),
        ),
    )
    .await
    .expect("poller loop did not stop");

    // Initial delay, then one interval before the single completed cycle
    assert_eq!(received.lock().unwrap().len(), 1);
    assert_eq!(sleeps.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn poller_delivers_snapshots_after_start() {
    let services = vec![recent_web_service("srv1", "api")];
    let api = Arc::new(FakeRenderApi::with_services(services));
    api.add_deploys("srv1", vec![render_deploy("dep1", "fix bug")]);
    let source = Arc::new(RenderSource::new(api, RenderOptions::default()));
    let creds: Arc<dyn CredentialProvider> = Arc::new(all_credentials());
    let poller = Poller::new(source, creds, fast_options());

    let (tx, mut rx) = mpsc::unbounded_channel();
    poller.set_callback(move |snapshot| {
        let _ = tx.send(snapshot);
    });

    // Nothing is delivered before start
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(rx.try_recv().is_err());

    poller.start();
    let snapshot = tokio::time::timeout(WAIT, rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.deploys[0].deploy_id, "dep1");

    let handle = poller.stop().expect("first stop returns the task");
    tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
    assert!(poller.stop().is_none());
    assert!(!poller.is_running());
}

#[tokio::test]
async fn start_twice_keeps_a_single_task() {
    let source = Arc::new(VercelSource::new(Arc::new(FakeVercelApi::default())));
    let creds: Arc<dyn CredentialProvider> = Arc::new(all_credentials());
    let poller = Poller::new(source, creds, fast_options());
    let (tx, mut rx) = mpsc::unbounded_channel();
    poller.set_callback(move |snapshot| {
        let _ = tx.send(snapshot);
    });

    assert!(poller.start());
    assert!(!poller.start());
    assert!(poller.is_running());
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .unwrap()
        .unwrap();

    // One registered task: the first stop hands it back, the second finds nothing
    let handle = poller.stop().unwrap();
    tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
    assert!(poller.stop().is_none());

    assert!(poller.start());
    assert!(poller.is_running());
    poller.stop().unwrap().await.unwrap();
}

#[tokio::test]
async fn replaced_callback_receives_later_snapshots() {
    let source = Arc::new(VercelSource::new(Arc::new(FakeVercelApi::default())));
    let creds: Arc<dyn CredentialProvider> = Arc::new(all_credentials());
    let poller = Poller::new(source, creds, fast_options());

    let first = Arc::new(AtomicUsize::new(0));
    let counter = first.clone();
    poller.set_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    poller.set_callback(move |snapshot| {
        let _ = tx.send(snapshot);
    });

    poller.start();
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .unwrap()
        .unwrap();
    poller.stop().unwrap().await.unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn credential_updates_apply_on_the_next_cycle() {
    let source = VercelSource::new(Arc::new(FakeVercelApi::default()));
    let creds = FakeCredentials::with(&[(CredentialKey::VercelApiKey, "vercel_key")]);
    let (slot, received) = collecting_slot();

    assert!(!run_cycle(&source, &creds, &slot).await);
    creds.set(CredentialKey::VercelTeamId, "team_1");
    assert!(run_cycle(&source, &creds, &slot).await);
    creds.clear(CredentialKey::VercelApiKey);
    assert!(!run_cycle(&source, &creds, &slot).await);

    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn loop_keeps_ticking_after_failed_cycles() {
    let api = Arc::new(FakeVercelApi::default());
    *api.failures_left.lock().unwrap() = 3;
    let source = Arc::new(VercelSource::new(api.clone()));
    let creds: Arc<dyn CredentialProvider> = Arc::new(all_credentials());
    let poller = Poller::new(source, creds, fast_options());
    let (tx, mut rx) = mpsc::unbounded_channel();
    poller.set_callback(move |snapshot| {
        let _ = tx.send(snapshot);
    });

    poller.start();
    let snapshot = tokio::time::timeout(WAIT, rx.recv())
        .await
        .unwrap()
        .unwrap();
    poller.stop().unwrap().await.unwrap();

    assert_eq!(snapshot.platform, Platform::Vercel);
    assert!(api.calls.lock().unwrap().len() >= 4);
    assert_eq!(*api.failures_left.lock().unwrap(), 0);
}

#[tokio::test]
async fn cycle_in_flight_at_stop_still_delivers() {
    let api = Arc::new(FakeVercelApi::default());
    *api.hold.lock().unwrap() = true;
    let source = Arc::new(VercelSource::new(api.clone()));
    let creds: Arc<dyn CredentialProvider> = Arc::new(all_credentials());
    let poller = Poller::new(source, creds, fast_options());
    let (tx, mut rx) = mpsc::unbounded_channel();
    poller.set_callback(move |snapshot| {
        let _ = tx.send(snapshot);
    });

    poller.start();
    tokio::time::timeout(WAIT, api.entered.notified())
        .await
        .unwrap();
    let handle = poller.stop().unwrap();

    // The old cycle has not finished, so a restart must wait for it
    assert!(!poller.start());

    api.release.notify_one();
    tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();

    assert_ok!(rx.try_recv());
    assert!(rx.try_recv().is_err());
    assert_eq!(api.calls.lock().unwrap().len(), 1);

    *api.hold.lock().unwrap() = false;
    assert!(poller.start());
    poller.stop().unwrap().await.unwrap();
}
