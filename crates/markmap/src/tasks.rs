use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Shared cancel flag. The owner keeps one clone, every task it schedules carries another.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefitTarget {
    Inline,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Re-measure a diagram's surface and fit the diagram to it.
    Refit { block: usize, target: RefitTarget },
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
    token: CancellationToken,
}

/// Deferred work ordered by due time, then by scheduling order.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, task: Task, token: CancellationToken) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due,
            seq,
            task,
            token,
        });
    }

    /// Removes and returns every task due at `now`, earliest first. Cancelled tasks are
    /// returned too; callers decide how to report them.
    pub fn take_due(&mut self, now: Duration) -> Vec<(Task, CancellationToken)> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| (s.task, s.token)).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
