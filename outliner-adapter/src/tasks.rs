use alloc::collections::VecDeque;
use alloc::collections::vec_deque;

use outliner::NodeId;

/// Work posted from inside a host callback, to run once that callback has returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingTask {
    /// Hide a deselected node again if the filter no longer protects it.
    ReleaseProtection(NodeId),
}

/// FIFO of [`PendingTask`]s. Drained before the next mutation is accepted.
#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<PendingTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, task: PendingTask) {
        self.tasks.push_back(task);
    }

    /// Takes every queued task, oldest first.
    pub fn drain(&mut self) -> vec_deque::IntoIter<PendingTask> {
        core::mem::take(&mut self.tasks).into_iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
