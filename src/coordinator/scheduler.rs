//! Timer scheduling for debounce and chunk yields
//!
//! The coordinator never sleeps. It asks a [`Scheduler`] to deliver a
//! [`Timer`] after a delay and reacts when the host hands that timer back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Idle interval before a full reconciliation pass
    Debounce,
    /// Yield between two chunks of a progressive load
    NextChunk,
}

/// Identity of a scheduled timer; a fired timer is stale unless it equals
/// the coordinator's live one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timer {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

pub trait Scheduler {
    /// Arrange for `timer` to be delivered back after `delay`
    fn schedule_after(&mut self, delay: Duration, timer: Timer) -> TimerHandle;

    /// Best effort: a timer already in flight may still be delivered
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone)]
struct PendingTimer {
    handle: TimerHandle,
    due: Duration,
    timer: Timer,
}

/// Deterministic scheduler driven by a virtual clock
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Due time of a pending timer, if still scheduled
    pub fn due_time(&self, timer: Timer) -> Option<Duration> {
        self.pending
            .iter()
            .find(|p| p.timer == timer)
            .map(|p| p.due)
    }

    /// Move the clock forward by `by`, firing every timer that falls due.
    ///
    /// Timers fire in due order (then scheduling order). `fire` may schedule
    /// more timers; those fire too if they fall due within the same advance.
    pub fn advance<F>(&mut self, by: Duration, mut fire: F)
    where
        F: FnMut(&mut Self, Timer),
    {
        let target = self.now + by;
        while let Some(index) = self.next_due(target) {
            let pending = self.pending.remove(index);
            self.now = self.now.max(pending.due);
            fire(self, pending.timer);
        }
        self.now = target;
    }

    /// Fire timers until none remain, jumping the clock as needed.
    ///
    /// Returns the number of timers fired, stopping after `limit`.
    pub fn run_until_idle<F>(&mut self, limit: usize, mut fire: F) -> usize
    where
        F: FnMut(&mut Self, Timer),
    {
        let mut fired = 0;
        while fired < limit {
            let Some(index) = self.next_due(Duration::MAX) else {
                break;
            };
            let pending = self.pending.remove(index);
            self.now = self.now.max(pending.due);
            fire(self, pending.timer);
            fired += 1;
        }
        fired
    }

    fn next_due(&self, limit: Duration) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= limit)
            .min_by_key(|(_, p)| (p.due, p.handle.0))
            .map(|(index, _)| index)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(PendingTimer {
            handle,
            due: self.now + delay,
            timer,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|p| p.handle != handle);
    }
}

/// Scheduler that sleeps on background threads and delivers due timers
/// over a channel to the owning context
#[derive(Debug)]
pub struct ThreadScheduler {
    sender: Sender<Timer>,
    next_handle: u64,
    cancelled: HashMap<TimerHandle, Arc<AtomicBool>>,
}

impl ThreadScheduler {
    pub fn new() -> (Self, Receiver<Timer>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                next_handle: 0,
                cancelled: HashMap::new(),
            },
            receiver,
        )
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_after(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        // Drop flags whose thread has already finished
        self.cancelled.retain(|_, flag| Arc::strong_count(flag) > 1);

        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let flag = Arc::new(AtomicBool::new(false));
        self.cancelled.insert(handle, flag.clone());

        let tx = self.sender.clone();
        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            if !flag.load(Ordering::Acquire) {
                let _ = tx.send(timer);
            }
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(flag) = self.cancelled.remove(&handle) {
            flag.store(true, Ordering::Release);
        }
    }
}
