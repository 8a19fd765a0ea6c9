use std::sync::Arc;
use std::time::{Duration, Instant};

use stacks_core::Notification;

pub type NotificationId = u64;

/// Where toasts are drawn.
pub trait NotificationSink: Send + Sync {
    fn show(&self, id: NotificationId, notification: &Notification);
    fn dismiss(&self, id: NotificationId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNotification {
    pub id: NotificationId,
    pub notification: Notification,
    pub expires_at: Instant,
}

/// Transient feedback. Toasts are not queued: each one is shown at once and
/// expires on its own clock.
pub struct Notifier {
    enabled: bool,
    display_for: Duration,
    sink: Arc<dyn NotificationSink>,
    active: Vec<ActiveNotification>,
    next_id: NotificationId,
}

impl Notifier {
    pub fn new(enabled: bool, display_for: Duration, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            enabled,
            display_for,
            sink,
            active: Vec::new(),
            next_id: 1,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `None` when notifications are turned off.
    pub fn notify(&mut self, notification: Notification, now: Instant) -> Option<NotificationId> {
        if !self.enabled {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.sink.show(id, &notification);
        self.active.push(ActiveNotification {
            id,
            notification,
            expires_at: now + self.display_for,
        });
        Some(id)
    }

    /// Dismiss every toast whose display time has passed.
    pub fn expire(&mut self, now: Instant) -> Vec<NotificationId> {
        let mut expired = Vec::new();
        self.active.retain(|active| {
            if active.expires_at <= now {
                expired.push(active.id);
                false
            } else {
                true
            }
        });
        for id in &expired {
            self.sink.dismiss(*id);
        }
        expired
    }

    pub fn active(&self) -> &[ActiveNotification] {
        &self.active
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.active.iter().map(|active| active.expires_at).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacks_core::NotifyLevel;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        shown: Mutex<Vec<(NotificationId, Notification)>>,
        dismissed: Mutex<Vec<NotificationId>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&self, id: NotificationId, notification: &Notification) {
            self.shown.lock().unwrap().push((id, notification.clone()));
        }

        fn dismiss(&self, id: NotificationId) {
            self.dismissed.lock().unwrap().push(id);
        }
    }

    #[test]
    fn disabled_notifier_shows_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let mut notifier = Notifier::new(false, Duration::from_secs(3), sink.clone());

        let id = notifier.notify(
            Notification::new("Added to queue", NotifyLevel::Success),
            Instant::now(),
        );

        assert_eq!(id, None);
        assert!(notifier.active().is_empty());
        assert!(sink.shown.lock().unwrap().is_empty());
    }

    #[test]
    fn overlapping_toasts_expire_independently() {
        let sink = Arc::new(RecordingSink::default());
        let mut notifier = Notifier::new(true, Duration::from_secs(3), sink.clone());
        let start = Instant::now();

        let first = notifier
            .notify(Notification::new("one", NotifyLevel::Info), start)
            .unwrap();
        let second = notifier
            .notify(
                Notification::new("two", NotifyLevel::Error),
                start + Duration::from_secs(1),
            )
            .unwrap();
        assert_eq!(notifier.active().len(), 2);
        assert_eq!(notifier.next_expiry(), Some(start + Duration::from_secs(3)));

        assert!(notifier.expire(start + Duration::from_secs(2)).is_empty());
        assert_eq!(notifier.expire(start + Duration::from_secs(3)), vec![first]);
        assert_eq!(notifier.active().len(), 1);
        assert_eq!(notifier.expire(start + Duration::from_secs(4)), vec![second]);
        assert_eq!(notifier.next_expiry(), None);
        assert_eq!(*sink.dismissed.lock().unwrap(), vec![first, second]);
    }
}
