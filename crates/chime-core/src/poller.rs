//! Background tick source.
//!
//! The poller owns at most one isolated worker, spawned through the
//! injected [`WorkerSpawner`] port. The worker decides its own cadence and
//! sends tick messages back; the poller only reacts to them, invoking the
//! evaluation callback once per message, in arrival order. Heavy work on
//! the caller's side never delays the worker's ticks.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ConfigError;

/// Initial parameters posted to a freshly spawned worker.
/// Serializes as `{ "second": n }`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickParams {
    pub second: u64,
}

/// Inbound tick message. The payload carries no information; arrival is
/// the signal.
#[derive(Debug, Clone, Copy)]
pub struct Tick;

/// Handle to a live worker.
pub trait WorkerHandle: Send {
    /// Post a message to the worker.
    fn post(&self, params: TickParams);
    /// Stop the worker. Immediate; may race one in-flight tick.
    fn terminate(self: Box<Self>);
}

/// Spawns the isolated execution context identified by an opaque source
/// reference. The worker owns its cadence.
pub trait WorkerSpawner: Send + Sync {
    fn spawn(
        &self,
        source: &str,
        ticks: mpsc::UnboundedSender<Tick>,
    ) -> Result<Box<dyn WorkerHandle>, ConfigError>;
}

/// Evaluation callback invoked once per inbound tick.
pub type TickCallback = Box<dyn FnMut() + Send>;

struct LiveWorker {
    handle: Box<dyn WorkerHandle>,
    pump: JoinHandle<()>,
}

/// Owns at most one live background worker at a time.
pub struct Poller {
    spawner: Arc<dyn WorkerSpawner>,
    live: Option<LiveWorker>,
}

impl Poller {
    pub fn new(spawner: Arc<dyn WorkerSpawner>) -> Self {
        Self {
            spawner,
            live: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    /// Spawn the worker, post it the initial parameters, and pump its
    /// ticks into `on_tick` -- one call per message, in arrival order
    /// (single-consumer, ordered mailbox; no coalescing).
    ///
    /// A blank `source` is a fatal misconfiguration: fails synchronously
    /// with [`ConfigError::MissingWorkerSource`], spawns nothing, and is
    /// not retried. A stale worker from an earlier `start` is torn down
    /// first, so exactly one worker is ever live.
    pub fn start(
        &mut self,
        source: &str,
        params: TickParams,
        on_tick: TickCallback,
    ) -> Result<(), ConfigError> {
        if source.trim().is_empty() {
            return Err(ConfigError::MissingWorkerSource);
        }
        self.stop();

        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
        let handle = self.spawner.spawn(source, tick_tx)?;
        handle.post(params);

        let pump = tokio::spawn(async move {
            let mut on_tick = on_tick;
            while tick_rx.recv().await.is_some() {
                on_tick();
            }
        });

        self.live = Some(LiveWorker { handle, pump });
        Ok(())
    }

    /// Idempotent: with nothing running this is a no-op. Otherwise
    /// terminates the worker and the pump and clears the handle, so a
    /// subsequent `start` creates a fresh worker.
    pub fn stop(&mut self) {
        if let Some(live) = self.live.take() {
            live.handle.terminate();
            live.pump.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Spawner that hands the tick sender back to the test so ticks can be
    /// injected manually.
    #[derive(Default)]
    struct ManualSpawner {
        ticks: Mutex<Option<mpsc::UnboundedSender<Tick>>>,
        spawned: AtomicUsize,
        terminated: Arc<AtomicBool>,
    }

    struct ManualHandle {
        posted: Arc<Mutex<Vec<u64>>>,
        terminated: Arc<AtomicBool>,
    }

    impl WorkerHandle for ManualHandle {
        fn post(&self, params: TickParams) {
            self.posted.lock().unwrap().push(params.second);
        }
        fn terminate(self: Box<Self>) {
            self.terminated.store(true, Ordering::SeqCst);
        }
    }

    struct SharedManualSpawner(Arc<ManualSpawner>, Arc<Mutex<Vec<u64>>>);

    impl WorkerSpawner for SharedManualSpawner {
        fn spawn(
            &self,
            _source: &str,
            ticks: mpsc::UnboundedSender<Tick>,
        ) -> Result<Box<dyn WorkerHandle>, ConfigError> {
            self.0.spawned.fetch_add(1, Ordering::SeqCst);
            *self.0.ticks.lock().unwrap() = Some(ticks);
            Ok(Box::new(ManualHandle {
                posted: Arc::clone(&self.1),
                terminated: Arc::clone(&self.0.terminated),
            }))
        }
    }

    fn manual() -> (Arc<ManualSpawner>, Arc<Mutex<Vec<u64>>>, Poller) {
        let spawner = Arc::new(ManualSpawner::default());
        let posted = Arc::new(Mutex::new(Vec::new()));
        let poller = Poller::new(Arc::new(SharedManualSpawner(
            Arc::clone(&spawner),
            Arc::clone(&posted),
        )));
        (spawner, posted, poller)
    }

    #[tokio::test]
    async fn blank_source_fails_without_spawning() {
        let (spawner, _posted, mut poller) = manual();
        let result = poller.start("", TickParams { second: 60 }, Box::new(|| {}));
        assert!(matches!(result, Err(ConfigError::MissingWorkerSource)));
        assert!(!poller.is_running());
        assert_eq!(spawner.spawned.load(Ordering::SeqCst), 0);

        let result = poller.start("   ", TickParams { second: 60 }, Box::new(|| {}));
        assert!(matches!(result, Err(ConfigError::MissingWorkerSource)));
        assert!(!poller.is_running());
    }

    #[tokio::test]
    async fn start_posts_initial_params() {
        let (_spawner, posted, mut poller) = manual();
        poller
            .start("manual", TickParams { second: 45 }, Box::new(|| {}))
            .unwrap();
        assert!(poller.is_running());
        assert_eq!(*posted.lock().unwrap(), vec![45]);
        poller.stop();
    }

    #[tokio::test]
    async fn pump_invokes_callback_per_tick_in_order() {
        let (spawner, _posted, mut poller) = manual();
        let (probe_tx, mut probe_rx) = mpsc::unbounded_channel();
        let mut n = 0u32;
        poller
            .start(
                "manual",
                TickParams { second: 60 },
                Box::new(move || {
                    n += 1;
                    let _ = probe_tx.send(n);
                }),
            )
            .unwrap();

        let ticks = spawner.ticks.lock().unwrap().clone().unwrap();
        for _ in 0..3 {
            ticks.send(Tick).unwrap();
        }
        for expected in 1u32..=3 {
            let got = tokio::time::timeout(Duration::from_secs(1), probe_rx.recv())
                .await
                .expect("tick not pumped")
                .expect("pump closed");
            assert_eq!(got, expected);
        }
        poller.stop();
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (spawner, _posted, mut poller) = manual();
        poller
            .start("manual", TickParams { second: 60 }, Box::new(|| {}))
            .unwrap();
        poller.stop();
        assert!(!poller.is_running());
        assert!(spawner.terminated.load(Ordering::SeqCst));
        poller.stop(); // nothing running; silent no-op
        assert!(!poller.is_running());
    }

    #[tokio::test]
    async fn restart_tears_down_stale_worker() {
        let (spawner, _posted, mut poller) = manual();
        poller
            .start("manual", TickParams { second: 60 }, Box::new(|| {}))
            .unwrap();
        poller
            .start("manual", TickParams { second: 60 }, Box::new(|| {}))
            .unwrap();
        assert!(spawner.terminated.load(Ordering::SeqCst));
        assert_eq!(spawner.spawned.load(Ordering::SeqCst), 2);
        assert!(poller.is_running());
        poller.stop();
    }

    #[test]
    fn tick_params_wire_shape() {
        let json = serde_json::to_string(&TickParams { second: 60 }).unwrap();
        assert_eq!(json, r#"{"second":60}"#);
    }
}
