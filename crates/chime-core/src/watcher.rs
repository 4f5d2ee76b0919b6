//! The composing component: watch list, poller, permission gate, and
//! notification emitter wired together.
//!
//! The watcher is a plain component object; an external shell (the CLI,
//! a GUI) performs the environment-specific mounting and drains the event
//! stream. All platform capabilities arrive as injected ports.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{CoreError, PermissionError};
use crate::events::Event;
use crate::notify::{AlertPort, AudioPort, NotificationEmitter};
use crate::permission::{PermissionGate, PermissionPort, PermissionState};
use crate::poller::{Poller, TickCallback, TickParams, WorkerSpawner};
use crate::watch::{ChangeHook, Selectable, TargetTime, WatchList};
use crate::window::TriggerWindow;

/// Platform capabilities injected into the core.
pub struct Ports {
    pub alerts: Arc<dyn AlertPort>,
    pub audio: Arc<dyn AudioPort>,
    pub permission: Arc<dyn PermissionPort>,
    pub worker: Arc<dyn WorkerSpawner>,
}

pub struct Watcher {
    list: Arc<Mutex<WatchList>>,
    poller: Mutex<Poller>,
    emitter: Arc<NotificationEmitter>,
    gate: PermissionGate,
    window: TriggerWindow,
    worker_source: String,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
}

impl Watcher {
    pub fn new(ports: Ports, config: &Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            list: Arc::new(Mutex::new(WatchList::new())),
            poller: Mutex::new(Poller::new(ports.worker)),
            emitter: Arc::new(NotificationEmitter::new(
                ports.alerts,
                ports.audio,
                &config.notifications.location,
            )),
            gate: PermissionGate::new(ports.permission),
            window: TriggerWindow::new(config.watch.window_seconds),
            worker_source: config.watch.worker_source.clone(),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Take the event stream. Yields every externally visible state
    /// change; can be taken once.
    pub fn events(&self) -> Option<mpsc::UnboundedReceiver<Event>> {
        self.events_rx.lock().unwrap().take()
    }

    pub fn window(&self) -> TriggerWindow {
        self.window
    }

    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    pub fn is_running(&self) -> bool {
        self.poller.lock().unwrap().is_running()
    }

    /// Register a toggle/target-time pair into the watch list.
    pub fn add(&self, selectable: Arc<dyn Selectable>, target: Arc<dyn TargetTime>) {
        let index = self.list.lock().unwrap().add(selectable, target);
        self.send(Event::WatchAdded {
            index,
            at: Utc::now(),
        });
    }

    /// Override the no-op hook fired on toggle flips and time edits.
    pub fn set_on_change(&self, hook: ChangeHook) {
        self.list.lock().unwrap().set_on_change(hook);
    }

    /// Await the platform permission decision. Denial is recoverable: the
    /// shell logs it and leaves the watch feature disabled.
    pub async fn request_permission(&self) -> Result<(), PermissionError> {
        match self.gate.request().await {
            Ok(()) => {
                self.send(Event::PermissionGranted { at: Utc::now() });
                Ok(())
            }
            Err(e) => {
                self.send(Event::PermissionDenied { at: Utc::now() });
                Err(e)
            }
        }
    }

    /// Bring up the background worker and evaluate the watch list on every
    /// tick. A tick whose due set is non-empty fires exactly one alert,
    /// regardless of how many items are due. Fails synchronously when no
    /// worker source is configured.
    pub fn start(&self) -> Result<(), CoreError> {
        let list = Arc::clone(&self.list);
        let emitter = Arc::clone(&self.emitter);
        let window = self.window;
        let events = self.events_tx.clone();
        let on_tick: TickCallback = Box::new(move || {
            let now = Utc::now();
            let due = list.lock().unwrap().due_items(now, window);
            if !due.is_empty() {
                emitter.emit();
                let _ = events.send(Event::AlertFired {
                    due_count: due.len(),
                    at: now,
                });
            }
        });

        self.poller.lock().unwrap().start(
            &self.worker_source,
            TickParams {
                second: window.seconds(),
            },
            on_tick,
        )?;
        self.send(Event::WatcherStarted {
            window_seconds: window.seconds(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Tear down the background worker. Safe to call repeatedly; with
    /// nothing running this is a silent no-op.
    pub fn stop(&self) {
        let mut poller = self.poller.lock().unwrap();
        if poller.is_running() {
            poller.stop();
            self.send(Event::WatcherStopped { at: Utc::now() });
        }
    }

    fn send(&self, event: Event) {
        // The shell may never take the receiver; delivery is best-effort.
        let _ = self.events_tx.send(event);
    }
}
