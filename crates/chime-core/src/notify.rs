//! Alert construction and dispatch.
//!
//! The emitter builds one fixed alert payload up front -- title, body,
//! vibration pattern, icon, and the stable tag -- and pushes it through the
//! injected alert and audio ports. Deduplication of rapid repeats is the
//! platform's job via the tag, not the emitter's.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use log::warn;
use serde::Serialize;
use url::Url;

/// Fixed alert strings; not configurable in current scope.
pub const ALERT_TITLE: &str = "Reminder";
pub const ALERT_BODY: &str = "A scheduled time has arrived.";

/// Vibration pattern carried on the alert payload.
pub const VIBRATE_PATTERN: [u32; 3] = [200, 200, 400];

/// Fixed icon filename joined onto the page location.
pub const ICON_FILE: &str = "favicon.svg";

/// Stable notification identity derived from a page location. The platform
/// coalesces alerts carrying the same tag instead of stacking them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationTag(String);

impl NotificationTag {
    /// Keep the host verbatim; replace path separators and dots inside the
    /// path with `_`; strip a trailing `_`.
    pub fn from_parts(host: &str, path: &str) -> Self {
        let mut tag = String::with_capacity(host.len() + path.len());
        tag.push_str(host);
        for c in path.chars() {
            tag.push(if c == '/' || c == '.' { '_' } else { c });
        }
        if tag.ends_with('_') {
            tag.pop();
        }
        NotificationTag(tag)
    }

    /// Derive from a full location string, stripping the scheme prefix.
    /// Inputs that do not parse as a URL are treated as a bare
    /// `host/path` string.
    pub fn from_location(location: &str) -> Self {
        if let Ok(url) = Url::parse(location) {
            if let Some(host) = url.host_str() {
                return Self::from_parts(host, url.path());
            }
        }
        let trimmed = location.split("://").last().unwrap_or(location);
        match trimmed.find('/') {
            Some(idx) => Self::from_parts(&trimmed[..idx], &trimmed[idx..]),
            None => Self::from_parts(trimmed, ""),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Icon URL: the page location joined with the fixed icon filename.
pub fn icon_url(location: &str) -> String {
    if location.ends_with('/') {
        format!("{location}{ICON_FILE}")
    } else {
        format!("{location}/{ICON_FILE}")
    }
}

/// The platform alert payload.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRequest {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub vibrate: Vec<u32>,
    pub renotify: bool,
    pub tag: String,
}

/// Shows a user-visible alert. Implementations must not block for long.
pub trait AlertPort: Send + Sync {
    fn show(&self, alert: &AlertRequest) -> Result<(), Box<dyn Error>>;
}

/// Plays the audible cue paired with the alert.
pub trait AudioPort: Send + Sync {
    fn play(&self) -> Result<(), Box<dyn Error>>;
}

/// Builds and dispatches the user-visible alert plus its sound cue.
pub struct NotificationEmitter {
    alerts: Arc<dyn AlertPort>,
    audio: Arc<dyn AudioPort>,
    request: AlertRequest,
}

impl NotificationEmitter {
    pub fn new(alerts: Arc<dyn AlertPort>, audio: Arc<dyn AudioPort>, location: &str) -> Self {
        let tag = NotificationTag::from_location(location);
        let icon = if location.is_empty() {
            None
        } else {
            Some(icon_url(location))
        };
        Self {
            alerts,
            audio,
            request: AlertRequest {
                title: ALERT_TITLE.to_string(),
                body: ALERT_BODY.to_string(),
                icon,
                vibrate: VIBRATE_PATTERN.to_vec(),
                renotify: true,
                tag: tag.as_str().to_string(),
            },
        }
    }

    /// The prebuilt payload every `emit` dispatches.
    pub fn request(&self) -> &AlertRequest {
        &self.request
    }

    /// Show the alert, then play the cue. Safe to call in quick
    /// succession: repeats replace the previous alert through the tag.
    /// Port failures are logged and never propagate; the cue still plays
    /// when the alert fails.
    pub fn emit(&self) {
        if let Err(e) = self.alerts.show(&self.request) {
            warn!("failed to show notification: {e}");
        }
        if let Err(e) = self.audio.play() {
            warn!("failed to play alert sound: {e}");
        }
    }
}
