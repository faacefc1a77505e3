// ── Transient status messages ──
//
// At most one notification is live. Showing a new one replaces the old and
// restarts the expiry timer; the timer clears only the notification it was
// started for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long a notification stays up.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

/// Styling tag. Carries no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Single-slot notification channel shared by the screens of a console.
///
/// Cheaply cloneable. Expiry uses a spawned tokio timer, so `show` must be
/// called from within a runtime for the message to auto-clear.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    current: watch::Sender<Option<Notification>>,
    /// Incremented on every show/clear; a timer only clears its own.
    seq: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
    ttl: Duration,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(ChannelInner {
                current,
                seq: AtomicU64::new(0),
                timer: Mutex::new(None),
                ttl,
            }),
        }
    }

    pub fn current(&self) -> Option<Notification> {
        self.inner.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.current.subscribe()
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(NotificationKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NotificationKind::Error, text);
    }

    /// Replace whatever is showing and restart the expiry timer.
    pub fn show(&self, kind: NotificationKind, text: impl Into<String>) {
        let notification = Notification {
            kind,
            text: text.into(),
            created_at: Utc::now(),
        };
        debug!(%kind, text = %notification.text, "notification");

        // Held until the timer is swapped: the surviving timer must belong
        // to the visible notification.
        let mut timer = self.inner.lock_timer();
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.current.send_replace(Some(notification));

        let next = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(&self.inner);
                Some(runtime.spawn(async move {
                    tokio::time::sleep(inner.ttl).await;
                    let _guard = inner.lock_timer();
                    if inner.seq.load(Ordering::SeqCst) == seq {
                        inner.current.send_replace(None);
                    }
                }))
            }
            Err(_) => {
                warn!("no tokio runtime, notification will not expire");
                None
            }
        };
        if let Some(previous) = std::mem::replace(&mut *timer, next) {
            previous.abort();
        }
    }

    /// Remove the notification now and cancel its timer.
    pub fn clear(&self) {
        let mut timer = self.inner.lock_timer();
        self.inner.seq.fetch_add(1, Ordering::SeqCst);
        self.inner.current.send_replace(None);
        if let Some(previous) = timer.take() {
            previous.abort();
        }
    }
}

impl ChannelInner {
    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
