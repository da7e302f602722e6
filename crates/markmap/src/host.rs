use crate::dom::Document;
use crate::tasks::{CancellationToken, DeterministicClock, Task, TaskQueue};
use std::time::Duration;

/// Everything the embedding environment owns: the document, the clock and deferred work.
#[derive(Debug)]
pub struct Host {
    pub document: Document,
    pub clock: DeterministicClock,
    pub tasks: TaskQueue,
}

impl Host {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            clock: DeterministicClock::new(),
            tasks: TaskQueue::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Runs `task` once `delay` has elapsed on the host clock, unless `token` is cancelled first.
    pub fn schedule(&mut self, delay: Duration, task: Task, token: CancellationToken) {
        let due = self.clock.now().saturating_add(delay);
        self.tasks.schedule(due, task, token);
    }

    /// Advances the clock and drains the tasks that became due.
    pub fn advance(&mut self, dt: Duration) -> Vec<(Task, CancellationToken)> {
        self.clock.advance(dt);
        self.tasks.take_due(self.clock.now())
    }
}
