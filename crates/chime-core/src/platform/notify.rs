use std::error::Error;

use notify_rust::Notification;

use crate::notify::{AlertPort, AlertRequest};

/// Desktop notification adapter.
///
/// The desktop protocol has no renotify flag; a stable replace-id derived
/// from the tag makes a fresh alert replace the previous one instead of
/// stacking. The vibration pattern has no desktop equivalent and is
/// dropped.
pub struct DesktopNotifier {
    appname: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            appname: "chime".to_string(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a, folded into the u32 id space the notification daemon accepts.
fn replace_id(tag: &str) -> u32 {
    tag.bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193))
}

impl AlertPort for DesktopNotifier {
    fn show(&self, alert: &AlertRequest) -> Result<(), Box<dyn Error>> {
        let mut notification = Notification::new();
        notification
            .appname(&self.appname)
            .summary(&alert.title)
            .body(&alert.body);
        if let Some(icon) = &alert.icon {
            notification.icon(icon);
        }
        if alert.renotify {
            notification.id(replace_id(&alert.tag));
        }
        notification.show()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_id_is_stable_per_tag() {
        assert_eq!(replace_id("example.com_app_page"), replace_id("example.com_app_page"));
        assert_ne!(replace_id("example.com_app_page"), replace_id("example.com_other"));
    }
}
