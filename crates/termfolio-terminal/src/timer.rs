//! Deferred execution on a host-driven millisecond clock.
//!
//! Nothing runs on its own: the host calls [`TimerQueue::advance_to`] with
//! the current time, and every callback due by then fires in due-time order.
//! Tests drive the same clock by hand.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type Callback = Box<dyn FnOnce()>;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Default)]
struct Inner {
    now: u64,
    next_seq: u64,
    /// Keyed by (due time, sequence) so equal due times fire FIFO.
    pending: BTreeMap<(u64, u64), Callback>,
}

/// Shared single-threaded timer queue. Clones refer to the same queue.
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<Inner>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds.
    pub fn now(&self) -> u64 {
        self.inner.borrow().now
    }

    /// Run `callback` once `delay_ms` has elapsed from now.
    pub fn schedule(&self, delay_ms: u64, callback: impl FnOnce() + 'static) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let due = inner.now.saturating_add(delay_ms);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.pending.insert((due, seq), Box::new(callback));
        TimerId(seq)
    }

    /// Drop a pending callback. Returns whether it was still pending.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let key = inner.pending.keys().find(|(_, seq)| *seq == id.0).copied();
        key.is_some_and(|k| inner.pending.remove(&k).is_some())
    }

    /// Move the clock forward to `now_ms`, firing every callback due by then.
    ///
    /// While a callback runs, [`now`](Self::now) reports its due time, so
    /// callbacks that reschedule themselves see a strictly increasing clock.
    /// Callbacks scheduled during the advance fire in the same call if they
    /// fall due by `now_ms`. The clock never moves backwards.
    pub fn advance_to(&self, now_ms: u64) -> usize {
        let mut fired = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                match inner.pending.first_key_value() {
                    Some((&(due, _), _)) if due <= now_ms => {
                        inner.now = inner.now.max(due);
                        inner.pending.pop_first().map(|(_, cb)| cb)
                    },
                    _ => None,
                }
            };
            let Some(callback) = next else { break };
            callback();
            fired += 1;
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(now_ms);
        fired
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance_by(&self, delta_ms: u64) -> usize {
        let target = self.now().saturating_add(delta_ms);
        self.advance_to(target)
    }

    /// Due time of the earliest pending callback.
    pub fn next_due(&self) -> Option<u64> {
        self.inner
            .borrow()
            .pending
            .first_key_value()
            .map(|(&(due, _), _)| due)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().pending.is_empty()
    }

    /// Drop every pending callback without running it.
    pub fn clear(&self) {
        let dropped = std::mem::take(&mut self.inner.borrow_mut().pending);
        drop(dropped);
    }
}
