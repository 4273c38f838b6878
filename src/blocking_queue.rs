use std::convert::TryFrom;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::cancel::{CancelToken, Interruptible};
use crate::{Error, Result};

/// Fixed-capacity FIFO shared between producer and consumer threads.
///
/// `enqueue` blocks while the queue is full and `dequeue` blocks while it is
/// empty. Cloning the queue hands out another handle to the same buffer.
pub struct BoundedBlockingQueue<T> {
    shared: Arc<Shared<T>>,
    capacity: usize,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

// Live elements occupy slots [head, head + count) modulo the slot count.
struct State<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T> State<T> {
    fn with_capacity(capacity: usize) -> State<T> {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        State {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    fn push(&mut self, item: T) {
        debug_assert!(!self.is_full());
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        item
    }
}

impl<T> BoundedBlockingQueue<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(String::from(
                "capacity must be positive",
            )));
        }
        Ok(BoundedBlockingQueue {
            shared: Arc::new(Shared {
                state: Mutex::new(State::with_capacity(capacity)),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
            }),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `item`, waiting for a free slot while the queue is full.
    pub fn enqueue(&self, item: T) {
        let mut state = self.lock();
        while state.is_full() {
            state = self
                .shared
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.push(item);
        self.shared.not_empty.notify_all();
    }

    /// Removes the oldest element, waiting while the queue is empty.
    pub fn dequeue(&self) -> T {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.pop() {
                self.shared.not_full.notify_all();
                return item;
            }
            state = self
                .shared
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Number of elements currently stored. The value may be stale as soon
    /// as it is returned.
    pub fn size(&self) -> usize {
        self.lock().count
    }

    /// Like `enqueue`, but gives up with `Error::Cancelled` once `token` is
    /// cancelled while waiting. A cancelled call leaves the queue untouched
    /// and drops `item`.
    pub fn enqueue_cancellable(&self, item: T, token: &CancelToken) -> Result<()> {
        self.check_token(token)?;
        self.enqueue_until(item, None, Some(token))
    }

    /// Like `dequeue`, but gives up with `Error::Cancelled` once `token` is
    /// cancelled while waiting.
    pub fn dequeue_cancellable(&self, token: &CancelToken) -> Result<T> {
        self.check_token(token)?;
        self.dequeue_until(None, Some(token))
    }

    /// Like `enqueue`, but returns `Error::Timeout` if no slot frees up
    /// within `timeout`. A zero timeout never blocks; a timeout too large to
    /// represent as a deadline waits without limit.
    pub fn enqueue_timeout(&self, item: T, timeout: Duration) -> Result<()> {
        self.enqueue_until(item, Instant::now().checked_add(timeout), None)
    }

    /// Like `dequeue`, but returns `Error::Timeout` if nothing arrives
    /// within `timeout`. A zero timeout never blocks; a timeout too large to
    /// represent as a deadline waits without limit.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<T> {
        self.dequeue_until(Instant::now().checked_add(timeout), None)
    }

    // A panicking thread never leaves State half-updated, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue_until(
        &self,
        item: T,
        deadline: Option<Instant>,
        token: Option<&CancelToken>,
    ) -> Result<()> {
        let mut state = self.lock();
        while state.is_full() {
            state = wait_once(&self.shared.not_full, state, deadline, token)?;
        }
        state.push(item);
        self.shared.not_empty.notify_all();
        Ok(())
    }

    fn dequeue_until(&self, deadline: Option<Instant>, token: Option<&CancelToken>) -> Result<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.pop() {
                self.shared.not_full.notify_all();
                return Ok(item);
            }
            state = wait_once(&self.shared.not_empty, state, deadline, token)?;
        }
    }

    fn check_token(&self, token: &CancelToken) -> Result<()> {
        if token.monitor_addr() != Arc::as_ptr(&self.shared) as *const () {
            return Err(Error::InvalidArgument(String::from(
                "cancel token belongs to another queue",
            )));
        }
        Ok(())
    }
}

// Suspends once on `cvar`. Cancellation and expiry are checked before
// suspending, with the lock held; the cancel flag is only ever set under the
// same lock, so a cancel racing with the wait cannot be missed.
fn wait_once<'a, T>(
    cvar: &Condvar,
    state: MutexGuard<'a, State<T>>,
    deadline: Option<Instant>,
    token: Option<&CancelToken>,
) -> Result<MutexGuard<'a, State<T>>> {
    if token.map_or(false, CancelToken::is_cancelled) {
        return Err(Error::Cancelled);
    }
    match deadline {
        None => Ok(cvar.wait(state).unwrap_or_else(PoisonError::into_inner)),
        Some(deadline) => {
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout);
            }
            let (state, _) = cvar
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            Ok(state)
        }
    }
}

impl<T: Send + 'static> BoundedBlockingQueue<T> {
    /// Mints a token that can abort `enqueue_cancellable` and
    /// `dequeue_cancellable` calls on this queue.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken::new(self.shared.clone())
    }
}

impl<T: Send> Interruptible for Shared<T> {
    fn interrupt(&self, flag: &AtomicBool) {
        let _state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        flag.store(true, std::sync::atomic::Ordering::Release);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

impl<T> TryFrom<i64> for BoundedBlockingQueue<T> {
    type Error = Error;

    fn try_from(capacity: i64) -> Result<Self> {
        match usize::try_from(capacity) {
            Ok(capacity) => BoundedBlockingQueue::new(capacity),
            Err(_) => Err(Error::InvalidArgument(format!(
                "capacity {} out of range",
                capacity
            ))),
        }
    }
}

impl<T> Clone for BoundedBlockingQueue<T> {
    fn clone(&self) -> Self {
        BoundedBlockingQueue {
            shared: self.shared.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBlockingQueue")
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .finish()
    }
}
