//! Platform adapters over the core's capability ports.
//!
//! Everything the core needs from the outside world -- showing alerts,
//! playing the cue, asking for permission, spawning the tick worker --
//! has a real implementation here. The core itself only ever sees the
//! port traits.

mod audio;
mod notify;
mod permission;
mod worker;

pub use audio::AlarmSound;
pub use notify::DesktopNotifier;
pub use permission::DesktopPermission;
pub use worker::IntervalSpawner;
