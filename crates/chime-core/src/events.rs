use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every externally visible state change produces an Event.
/// The composing shell drains these and renders or logs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PermissionGranted {
        at: DateTime<Utc>,
    },
    PermissionDenied {
        at: DateTime<Utc>,
    },
    WatchAdded {
        index: usize,
        at: DateTime<Utc>,
    },
    WatcherStarted {
        window_seconds: u64,
        at: DateTime<Utc>,
    },
    WatcherStopped {
        at: DateTime<Utc>,
    },
    /// A poll tick found at least one due item and fired a single alert.
    AlertFired {
        due_count: usize,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::AlertFired {
            due_count: 2,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"AlertFired\""));
        assert!(json.contains("\"due_count\":2"));
    }

    #[test]
    fn events_roundtrip() {
        let event = Event::WatcherStarted {
            window_seconds: 60,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::WatcherStarted { window_seconds, .. } => assert_eq!(window_seconds, 60),
            other => panic!("expected WatcherStarted, got {other:?}"),
        }
    }
}
