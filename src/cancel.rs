use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Monitor that can publish a cancellation to its waiters.
///
/// Implementors set `flag` while holding their own lock and then wake every
/// waiter, so a waiter that checks the flag under that lock sees it either
/// before suspending or right after being woken.
pub(crate) trait Interruptible: Send + Sync {
    fn interrupt(&self, flag: &AtomicBool);
}

/// Aborts blocking calls made with it on the queue that minted it.
///
/// Clones share the same flag. Once cancelled a token stays cancelled; mint a
/// fresh one from the queue to keep going.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    monitor: Arc<dyn Interruptible>,
}

impl CancelToken {
    pub(crate) fn new(monitor: Arc<dyn Interruptible>) -> CancelToken {
        CancelToken {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                monitor,
            }),
        }
    }

    /// Cancels every call currently blocked on this token, and every later
    /// call that would have to block.
    pub fn cancel(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.monitor.interrupt(&self.inner.cancelled);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn monitor_addr(&self) -> *const () {
        Arc::as_ptr(&self.inner.monitor) as *const ()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
