use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    tasks: VecDeque<Task>,
    /// Tasks dequeued by a worker and not yet completed. Queued tasks are
    /// not counted; `finish` checks the queue and this counter together.
    pending: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    all_idle: Condvar,
}

/// A fixed pool of worker threads draining a FIFO task queue.
///
/// Tasks are dispatched in submission order; completion order is
/// unspecified. A running task may submit further tasks. `finish` is the
/// termination barrier: it returns only once the queue is empty and no
/// dequeued task is still running. Tasks must never call `finish` on their
/// own queue.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    pub const DEFAULT_WORKERS: usize = 5;

    /// Starts `threads` workers (at least one) waiting in the background.
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            all_idle: Condvar::new(),
        });

        let workers = (0..threads)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(shared, id))
            })
            .collect();

        WorkQueue { shared, workers }
    }

    /// Appends a task and wakes one waiting worker.
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        let mut state = self.shared.state.lock();
        state.tasks.push_back(Box::new(task));
        trace!("task queued, {} outstanding", state.tasks.len());
        self.shared.work_available.notify_one();
    }

    /// Blocks until the queue is empty and every dequeued task has
    /// completed. Any number of threads may wait here independently.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while !state.tasks.is_empty() || state.pending > 0 {
            trace!(
                "finish() waiting at pending = {}, queued = {}",
                state.pending,
                state.tasks.len()
            );
            self.shared.all_idle.wait(&mut state);
        }
        debug!("finish() complete");
    }

    /// Asks the workers to exit. In-flight tasks run to completion; queued
    /// tasks are discarded.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        debug!("work queue shutting down, dropping {} queued tasks", state.tasks.len());
        self.shared.work_available.notify_all();
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>, id: usize) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if state.shutdown {
                    debug!("worker {} exiting", id);
                    return;
                }
                if let Some(task) = state.tasks.pop_front() {
                    // pending covers dequeued-but-unfinished work; the
                    // increment shares the critical section with the pop.
                    state.pending += 1;
                    trace!("worker {} took a task, pending = {}", id, state.pending);
                    break task;
                }
                trace!("worker {} waiting for work", id);
                shared.work_available.wait(&mut state);
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            warn!("worker {}: task panicked, worker continues", id);
        }

        let mut state = shared.state.lock();
        state.pending -= 1;
        trace!("worker {} finished a task, pending = {}", id, state.pending);
        if state.pending == 0 {
            shared.all_idle.notify_all();
        }
    }
}
