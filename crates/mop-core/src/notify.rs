//! Change notification
//!
//! Every accepted mutation of a ready instance is reported synchronously to
//! the observers registered on that instance, in registration order.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::value::{ObjectId, Value};

/// Kind of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Scalar assignment or positional replacement
    Set,
    /// Scalar cleared to null or reset to its default
    Unset,
    /// Single element added to a collection
    Add,
    /// Single element removed from a collection
    Remove,
    /// Batch of elements added to a collection
    AddMany,
}

/// A single change event
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Instance whose feature changed
    pub notifier: ObjectId,
    /// Feature descriptor that changed
    pub feature: ObjectId,
    /// Kind of change
    pub kind: NotificationKind,
    /// Previous value (`Null` when not applicable)
    pub old: Value,
    /// New value (`Null` when not applicable; a `List` for batches)
    pub new: Value,
    /// Collection position affected, if positional
    pub position: Option<usize>,
}

impl Notification {
    pub(crate) fn new(
        notifier: ObjectId,
        feature: ObjectId,
        kind: NotificationKind,
        old: Value,
        new: Value,
    ) -> Self {
        Self {
            notifier,
            feature,
            kind,
            old,
            new,
            position: None,
        }
    }

    pub(crate) fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// Receiver of change notifications
pub trait Observer: Send {
    /// Called once per change on the observed instance
    fn notify_changed(&mut self, notification: &Notification);
}

impl<F> Observer for F
where
    F: FnMut(&Notification) + Send,
{
    fn notify_changed(&mut self, notification: &Notification) {
        self(notification)
    }
}

/// Registration handle returned by `add_observer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

/// Shareable observer that records every notification it receives
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded notifications
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().clone()
    }

    /// Kinds of the recorded notifications, in order
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.events.lock().iter().map(|n| n.kind).collect()
    }

    /// Number of recorded notifications
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop recorded notifications
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Observer for NotificationLog {
    fn notify_changed(&mut self, notification: &Notification) {
        self.events.lock().push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer() {
        let mut seen = 0;
        {
            let mut obs = |_: &Notification| seen += 1;
            let n = Notification::new(
                ObjectId::new(0, 0),
                ObjectId::new(1, 0),
                NotificationKind::Set,
                Value::Null,
                Value::Int(1),
            );
            obs.notify_changed(&n);
            obs.notify_changed(&n);
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_log_shared_between_clones() {
        let log = NotificationLog::new();
        let mut handle = log.clone();
        let n = Notification::new(
            ObjectId::new(0, 0),
            ObjectId::new(1, 0),
            NotificationKind::Add,
            Value::Null,
            Value::Int(1),
        )
        .at(0);
        handle.notify_changed(&n);
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].position, Some(0));
        assert_eq!(log.kinds(), vec![NotificationKind::Add]);
        log.clear();
        assert!(log.is_empty());
    }
}
