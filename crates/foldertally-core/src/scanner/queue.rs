//! Shared FIFO of folder jobs.
//!
//! Every worker both consumes from and produces into the same queue, so a
//! momentarily empty queue does not mean the scan is over. The queue is
//! only told that no more work will ever arrive via [`WorkQueue::close`],
//! which the engine calls when the pending-folder count reaches zero.
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

/// A directory path awaiting enumeration.
pub type FolderJob = PathBuf;

/// Result of [`WorkQueue::wait_pop`].
#[derive(Debug, PartialEq, Eq)]
pub enum Pop {
    /// A job was taken off the queue.
    Job(FolderJob),
    /// The queue is closed and empty. The caller should exit.
    Closed,
    /// Nothing arrived before the timeout (or the waiter was woken without
    /// a job, e.g. by cancellation). Re-check state and call again.
    Empty,
}

struct Jobs {
    items: VecDeque<FolderJob>,
    closed: bool,
}

/// Mutex-guarded job list plus a condition variable for idle workers.
pub struct WorkQueue {
    jobs: Mutex<Jobs>,
    ready: Condvar,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Jobs {
                items: VecDeque::new(),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append a job and wake one waiter.
    pub fn push(&self, job: FolderJob) {
        self.jobs.lock().items.push_back(job);
        self.ready.notify_one();
    }

    /// Non-blocking pop.
    pub fn try_pop(&self) -> Option<FolderJob> {
        self.jobs.lock().items.pop_front()
    }

    /// Block until a job is available, the queue is closed, or `timeout`
    /// elapses.
    ///
    /// The closed check and the wait happen under the same lock that
    /// [`close`](Self::close) takes, so a close cannot slip in between them.
    pub fn wait_pop(&self, timeout: Duration) -> Pop {
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.items.pop_front() {
            return Pop::Job(job);
        }
        if jobs.closed {
            return Pop::Closed;
        }

        self.ready.wait_for(&mut jobs, timeout);

        match jobs.items.pop_front() {
            Some(job) => Pop::Job(job),
            None if jobs.closed => Pop::Closed,
            None => Pop::Empty,
        }
    }

    /// Mark the queue as finished and wake every waiter.
    pub fn close(&self) {
        self.jobs.lock().closed = true;
        self.ready.notify_all();
    }

    /// Wake every waiter without changing the queue.
    pub fn wake_all(&self) {
        // Taking the lock orders this wake after any in-progress check.
        let _jobs = self.jobs.lock();
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.jobs.lock().closed
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().items.is_empty()
    }
}
