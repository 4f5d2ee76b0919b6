//! # Chime Core Library
//!
//! Core logic for chime, a small scheduler that watches user-selected
//! target timestamps and fires a desktop notification (with a sound cue)
//! when the current time enters a configurable trigger window before a
//! selected target.
//!
//! ## Architecture
//!
//! - **TriggerWindow**: pure time-window matching policy
//! - **WatchList**: ordered toggle/target-time pairs, read live at
//!   evaluation time
//! - **Poller**: background tick source in an isolated tokio task,
//!   message-driven so heavy work on the caller's side never delays ticks
//! - **PermissionGate**: async state machine over the platform permission
//!   prompt
//! - **NotificationEmitter**: tag-deduplicated alert plus audio cue
//! - **Watcher**: the composing component an external shell mounts
//!
//! Platform capabilities (alerts, audio, permission, worker spawning) are
//! injected as ports so the core is testable against fakes; the real
//! adapters live in [`platform`].

pub mod config;
pub mod error;
pub mod events;
pub mod notify;
pub mod permission;
pub mod platform;
pub mod poller;
pub mod watch;
pub mod watcher;
pub mod window;

pub use config::Config;
pub use error::{ConfigError, CoreError, PermissionError};
pub use events::Event;
pub use notify::{AlertPort, AlertRequest, AudioPort, NotificationEmitter, NotificationTag};
pub use permission::{PermissionGate, PermissionPort, PermissionResponse, PermissionState};
pub use poller::{Poller, Tick, TickParams, WorkerHandle, WorkerSpawner};
pub use watch::{ChangeHook, Selectable, TargetTime, WatchList, WatchedItem};
pub use watcher::{Ports, Watcher};
pub use window::TriggerWindow;
