use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time;

use crate::error::PoolError;

/// One pool member and its reservation state.
struct Entry<T> {
    item: T,
    captured: bool,
}

/// A capture request waiting for a release.
struct Waiter<T> {
    ticket: u64,
    tx: oneshot::Sender<T>,
}

struct PoolState<T> {
    entries: Vec<Entry<T>>,
    cursor: usize,
    waiters: VecDeque<Waiter<T>>,
    next_ticket: u64,
}

impl<T: PartialEq> PoolState<T> {
    fn position(&self, item: &T) -> Option<usize> {
        self.entries.iter().position(|e| e.item == *item)
    }

    /// Round-robin scan for a free entry starting at the cursor.
    fn scan_free(&mut self) -> Option<usize> {
        let len = self.entries.len();
        for step in 0..len {
            let idx = (self.cursor + step) % len;
            if !self.entries[idx].captured {
                self.cursor = (idx + 1) % len;
                return Some(idx);
            }
        }
        None
    }

    /// Hands `item` to the oldest waiter still listening.
    ///
    /// Waiters whose capture future was dropped are discarded on the way.
    fn hand_over(&mut self, mut item: T) -> Result<(), T> {
        while let Some(waiter) = self.waiters.pop_front() {
            match waiter.tx.send(item) {
                Ok(()) => return Ok(()),
                Err(back) => item = back,
            }
        }
        Err(item)
    }

    /// Returns a captured item: to the oldest waiter, or back to the free set.
    fn give_back(&mut self, item: T) {
        if let Err(item) = self.hand_over(item) {
            if let Some(idx) = self.position(&item) {
                self.entries[idx].captured = false;
            }
        }
    }

    fn remove_waiter(&mut self, ticket: u64) -> bool {
        match self.waiters.iter().position(|w| w.ticket == ticket) {
            Some(idx) => {
                self.waiters.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Bounded set of interchangeable workers with exclusive and shared allocation.
///
/// Cloning the pool is cheap; clones share the same state.
///
/// ### Rules
/// - Each item is either **free** or **captured**; `next()` never changes that.
/// - `release()` hands the item straight to the oldest waiting `capture()`.
/// - A `capture()` that timed out is out of the queue and never receives an item.
/// - A `capture()` dropped after an item was handed to it gives the item back.
/// - The internal lock is never held across an `.await`.
pub struct WorkerPool<T> {
    state: Arc<Mutex<PoolState<T>>>,
    wait: Option<Duration>,
}

impl<T> Clone for WorkerPool<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            wait: self.wait,
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> WorkerPool<T> {
    /// Creates an empty pool; `wait = None` lets captures wait forever.
    pub fn new(wait: Option<Duration>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                entries: Vec::new(),
                cursor: 0,
                waiters: VecDeque::new(),
                next_ticket: 0,
            })),
            wait,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Capture timeout this pool was created with.
    pub fn wait(&self) -> Option<Duration> {
        self.wait
    }

    /// Registers an item; returns `false` if it is already a member.
    ///
    /// If captures are waiting, the new item goes to the oldest of them.
    pub fn add(&self, item: T) -> bool {
        let mut st = self.lock();
        if st.position(&item).is_some() {
            return false;
        }
        let captured = st.hand_over(item.clone()).is_ok();
        st.entries.push(Entry { item, captured });
        true
    }

    /// Reserves one item exclusively.
    ///
    /// Resolves immediately when an item is free; otherwise waits in FIFO order
    /// until a [`release`](Self::release) hands one over, or fails with
    /// [`PoolError::NoThreadAvailable`] once the pool's `wait` elapses.
    pub async fn capture(&self) -> Result<T, PoolError> {
        let (ticket, rx) = {
            let mut st = self.lock();
            if let Some(idx) = st.scan_free() {
                st.entries[idx].captured = true;
                return Ok(st.entries[idx].item.clone());
            }
            let (tx, rx) = oneshot::channel();
            let ticket = st.next_ticket;
            st.next_ticket += 1;
            st.waiters.push_back(Waiter { ticket, tx });
            (ticket, rx)
        };
        let mut pending = PendingCapture {
            pool: self,
            ticket,
            rx,
        };

        let received = match self.wait {
            Some(wait) => time::timeout(wait, &mut pending.rx).await.ok(),
            None => Some((&mut pending.rx).await),
        };

        match received {
            Some(Ok(item)) => Ok(item),
            Some(Err(_closed)) => Err(PoolError::NoThreadAvailable),
            None => pending.withdraw().ok_or(PoolError::NoThreadAvailable),
        }
    }

    /// Returns a captured item to the pool.
    pub fn release(&self, item: &T) -> Result<(), PoolError> {
        let mut st = self.lock();
        let idx = st.position(item).ok_or(PoolError::UnknownItem)?;
        if !st.entries[idx].captured {
            return Err(PoolError::NotCaptured);
        }
        st.give_back(item.clone());
        Ok(())
    }

    /// Picks a free item for shared dispatch without reserving it.
    ///
    /// Round-robin over free items; `None` if every item is captured.
    pub fn next(&self) -> Option<T> {
        let mut st = self.lock();
        st.scan_free().map(|idx| st.entries[idx].item.clone())
    }

    /// Whether `item` is currently captured.
    pub fn is_captured(&self, item: &T) -> bool {
        let st = self.lock();
        st.position(item).is_some_and(|idx| st.entries[idx].captured)
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }

    /// Number of free members.
    pub fn available(&self) -> usize {
        self.lock().entries.iter().filter(|e| !e.captured).count()
    }

    /// Number of queued capture requests.
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }
}

/// A queued `capture()` that has not resolved yet.
///
/// Dropping it leaves the queue; an item already handed over is given back
/// instead of being lost with the channel.
struct PendingCapture<'a, T: Clone + PartialEq + Send + 'static> {
    pool: &'a WorkerPool<T>,
    ticket: u64,
    rx: oneshot::Receiver<T>,
}

impl<T: Clone + PartialEq + Send + 'static> PendingCapture<'_, T> {
    /// Leaves the queue; returns the item if a release already won the race.
    fn withdraw(&mut self) -> Option<T> {
        let mut st = self.pool.lock();
        if st.remove_waiter(self.ticket) {
            return None;
        }
        self.rx.try_recv().ok()
    }
}

impl<T: Clone + PartialEq + Send + 'static> Drop for PendingCapture<'_, T> {
    fn drop(&mut self) {
        let mut st = self.pool.lock();
        if st.remove_waiter(self.ticket) {
            return;
        }
        if let Ok(item) = self.rx.try_recv() {
            st.give_back(item);
        }
    }
}
