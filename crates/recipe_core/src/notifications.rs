//! Transient success/error/info banners with scheduled, cancelable dismissal.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use crate::ViewEvent;

/// How long a banner stays fully visible.
pub const DISPLAY_DURATION: Duration = Duration::from_millis(2500);
/// Length of the fade-out before the banner is removed.
pub const FADE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Visible,
    Fading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub phase: NotificationPhase,
}

/// `Stack` keeps every banner until its own timer ends; `Supersede` dismisses
/// older banners when a new one is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPolicy {
    #[default]
    Stack,
    Supersede,
}

#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<NotificationInner>,
}

struct NotificationInner {
    policy: NotificationPolicy,
    events: broadcast::Sender<ViewEvent>,
    state: Mutex<NotificationState>,
}

#[derive(Default)]
struct NotificationState {
    // Newest first, like banners prepended to the top of the page.
    visible: Vec<Notification>,
    timers: HashMap<NotificationId, JoinHandle<()>>,
}

impl NotificationInner {
    fn lock_state(&self) -> MutexGuard<'_, NotificationState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_fading(&self, id: NotificationId) {
        let mut state = self.lock_state();
        if let Some(notification) = state.visible.iter_mut().find(|n| n.id == id) {
            notification.phase = NotificationPhase::Fading;
            let _ = self.events.send(ViewEvent::NotificationFading(id));
        }
    }

    fn expire(&self, id: NotificationId) {
        let mut state = self.lock_state();
        state.timers.remove(&id);
        let before = state.visible.len();
        state.visible.retain(|n| n.id != id);
        if state.visible.len() != before {
            let _ = self.events.send(ViewEvent::NotificationDismissed(id));
        }
    }
}

impl NotificationCenter {
    pub fn new(policy: NotificationPolicy, events: broadcast::Sender<ViewEvent>) -> Self {
        Self {
            inner: Arc::new(NotificationInner {
                policy,
                events,
                state: Mutex::new(NotificationState::default()),
            }),
        }
    }

    pub fn policy(&self) -> NotificationPolicy {
        self.inner.policy
    }

    /// Shows a banner and schedules its fade and removal. Must be called from
    /// within a tokio runtime.
    pub fn display(&self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        if self.inner.policy == NotificationPolicy::Supersede {
            self.dismiss_all();
        }

        let notification = Notification {
            id: NotificationId(Uuid::new_v4()),
            kind,
            message: message.into(),
            phase: NotificationPhase::Visible,
        };
        let id = notification.id;

        let mut state = self.inner.lock_state();
        state.visible.insert(0, notification.clone());
        let _ = self
            .inner
            .events
            .send(ViewEvent::NotificationShown(notification));

        let weak: Weak<NotificationInner> = Arc::downgrade(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(DISPLAY_DURATION).await;
            match weak.upgrade() {
                Some(inner) => inner.start_fading(id),
                None => return,
            }
            tokio::time::sleep(FADE_DURATION).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(id);
            }
        });
        state.timers.insert(id, timer);
        id
    }

    /// Removes a banner immediately and cancels its timer. Returns `false` if
    /// it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut state = self.inner.lock_state();
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        let before = state.visible.len();
        state.visible.retain(|n| n.id != id);
        let removed = state.visible.len() != before;
        if removed {
            let _ = self
                .inner
                .events
                .send(ViewEvent::NotificationDismissed(id));
        }
        removed
    }

    pub fn dismiss_all(&self) {
        let ids: Vec<NotificationId> = self.visible().iter().map(|n| n.id).collect();
        for id in ids {
            self.dismiss(id);
        }
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.inner.lock_state().visible.clone()
    }
}

impl Drop for NotificationInner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/notifications_tests.rs"]
mod tests;
