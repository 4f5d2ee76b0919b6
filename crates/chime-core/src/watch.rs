//! Watched items and the watch list.
//!
//! A watched item pairs a user-facing on/off toggle with a live-read
//! target time. Both collaborators are injected as ports so the list is
//! testable without any real UI component behind them.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::window::TriggerWindow;

/// Callback invoked when a collaborator reports a change.
pub type ChangeHook = Arc<dyn Fn() + Send + Sync>;

/// A boolean toggle exposing its checked state and a change signal.
pub trait Selectable: Send + Sync {
    fn checked(&self) -> bool;
    fn subscribe(&self, hook: ChangeHook);
}

/// A component exposing a readable target time and a change signal.
/// The time is read live at every evaluation, never snapshotted.
pub trait TargetTime: Send + Sync {
    fn current(&self) -> DateTime<Utc>;
    fn subscribe(&self, hook: ChangeHook);
}

/// Pairing of a selection toggle and a live-read target time.
#[derive(Clone)]
pub struct WatchedItem {
    selectable: Arc<dyn Selectable>,
    target: Arc<dyn TargetTime>,
}

impl WatchedItem {
    pub fn selected(&self) -> bool {
        self.selectable.checked()
    }

    /// Read live; edits to the underlying source are reflected without
    /// re-registration.
    pub fn target_time(&self) -> DateTime<Utc> {
        self.target.current()
    }
}

/// Shared slot for the list-level change hook. Collaborator subscriptions
/// route through the slot, so a hook installed after `add` still covers
/// earlier registrations.
#[derive(Clone, Default)]
struct ChangeRelay(Arc<RwLock<Option<ChangeHook>>>);

impl ChangeRelay {
    fn set(&self, hook: ChangeHook) {
        if let Ok(mut slot) = self.0.write() {
            *slot = Some(hook);
        }
    }

    fn hook(&self) -> ChangeHook {
        let slot = Arc::clone(&self.0);
        Arc::new(move || {
            let hook = slot.read().ok().and_then(|s| s.clone());
            if let Some(hook) = hook {
                hook();
            }
        })
    }
}

/// Ordered collection of watched items. Insertion order is irrelevant for
/// correctness; every item is evaluated independently.
#[derive(Default)]
pub struct WatchList {
    items: Vec<WatchedItem>,
    relay: ChangeRelay,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item and wire both collaborators' change signals to the
    /// list-level hook (a no-op until `set_on_change` installs one).
    /// Returns the item's index.
    pub fn add(&mut self, selectable: Arc<dyn Selectable>, target: Arc<dyn TargetTime>) -> usize {
        selectable.subscribe(self.relay.hook());
        target.subscribe(self.relay.hook());
        self.items.push(WatchedItem { selectable, target });
        self.items.len() - 1
    }

    /// Install the hook fired on any toggle flip or target-time edit.
    pub fn set_on_change(&self, hook: ChangeHook) {
        self.relay.set(hook);
    }

    /// Freshly computed on every call, in list order: selected items whose
    /// target falls inside the window. No side effects beyond port reads.
    pub fn due_items(&self, now: DateTime<Utc>, window: TriggerWindow) -> Vec<WatchedItem> {
        self.items
            .iter()
            .filter(|item| item.selected() && window.is_due(now, item.target_time()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
