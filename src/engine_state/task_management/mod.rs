//! # Task Management System
//!
//! This module provides a fixed pool of worker threads that execute tasks to
//! completion and hand their results back to a single coordinating thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskChannel`: Communication channel between the coordinating thread and one worker
//!
//! Each worker owns a dedicated pair of channels. Tasks are distributed round-robin to
//! workers with spare capacity; when every worker is busy the task waits in a FIFO
//! queue until one frees up.
//!
//! ## Failure Handling
//!
//! Workers catch panics raised by a task and report them as [`TaskError::Panicked`]
//! instead of dying. A worker whose channel disconnects while it still owes results is
//! reported as [`TaskError::WorkerDisconnected`]. Failures are returned from
//! [`TaskManager::drain`] next to the successful results; nothing is retried.
//!
//! ## Draining
//!
//! [`DrainPolicy::JoinAll`] blocks until every task published so far (queued ones
//! included) has produced a result. [`DrainPolicy::Poll`] only collects results that
//! are already waiting.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::<u32>::new(4)?;
//! task_manager.publish_task(Box::new(MyTask::new(/* ... */)));
//!
//! // In the coordinating loop:
//! let drained = task_manager.drain(DrainPolicy::JoinAll);
//! ```

pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use task::{BoxedTask, TaskTarget};
use thiserror::Error;

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Set to 1 so that a worker never holds a task it cannot start yet; waiting tasks
/// stay in the shared queue where any free worker can pick them up.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// How [`TaskManager::drain`] waits for results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// Block until every published task has finished.
    #[default]
    JoinAll,
    /// Take only results that have already arrived.
    Poll,
}

/// A task that did not produce a result.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The task panicked on its worker.
    #[error("task `{task}` panicked on worker {worker}: {message}")]
    Panicked {
        /// Worker index
        worker: usize,
        /// The task's own description
        task: String,
        /// The chunk the task was working on
        target: Option<TaskTarget>,
        /// Panic payload, when it was a string
        message: String,
    },

    /// A worker's result channel closed while it still had tasks in flight.
    #[error("worker {worker} disconnected with {in_flight} task(s) in flight")]
    WorkerDisconnected {
        /// Worker index
        worker: usize,
        /// Tasks lost with the worker
        in_flight: usize,
    },

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// What a worker sends back when a task panics.
#[derive(Debug)]
struct TaskFailure {
    task: String,
    target: Option<TaskTarget>,
    message: String,
}

type WorkerOutcome<R> = Result<R, TaskFailure>;

/// Results and failures collected by one [`TaskManager::drain`] call, in arrival
/// order per worker.
#[derive(Debug)]
pub struct DrainedTasks<R> {
    /// Values returned by tasks that completed
    pub results: Vec<R>,
    /// Tasks that did not complete
    pub failures: Vec<TaskError>,
}

impl<R> Default for DrainedTasks<R> {
    fn default() -> Self {
        DrainedTasks {
            results: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// A communication channel between the coordinating thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks to the worker
/// - `result_receiver`: Receives task outcomes from the worker
/// - `num_tasks_in_flight`: Tasks sent but not yet answered
/// - `worker`: Handle to the worker thread, joined when the manager drops
#[derive(Debug)]
struct TaskChannel<R> {
    task_sender: Sender<BoxedTask<R>>,
    result_receiver: Receiver<WorkerOutcome<R>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and joining worker threads
/// - Distributing tasks across available workers
/// - Queuing tasks when all workers are busy
/// - Collecting task outcomes on the coordinating thread
///
/// It is owned by a single coordinating thread; tasks themselves run elsewhere.
pub struct TaskManager<R> {
    channels: Vec<TaskChannel<R>>,
    queued_tasks: VecDeque<BoxedTask<R>>,
    current_channel: usize,
}

impl<R: Send + 'static> TaskManager<R> {
    /// Creates a new `TaskManager` with `num_workers` worker threads.
    ///
    /// # Errors
    /// Returns [`TaskError::Spawn`] if a worker thread cannot be started.
    pub fn new(num_workers: usize) -> Result<Self, TaskError> {
        info!(
            "Creating task manager with {} worker(s), available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<BoxedTask<R>>();
            let (result_tx, result_rx) = channel::<WorkerOutcome<R>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let description = task.describe();
                    let target = task.target();
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.process()))
                        .map_err(|payload| TaskFailure {
                            task: description,
                            target,
                            message: panic_message(payload.as_ref()),
                        });
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("voxel-worker-{index}"))
                .spawn(task_closure)?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker,
            });
        }

        Ok(TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks sent to a worker and not yet collected.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Whether every published task has been collected.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// Returns the task on failure (the worker is gone), allowing it to be requeued.
    fn try_send_task(&mut self, task: BoxedTask<R>, channel_idx: usize) -> Result<(), BoxedTask<R>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from the last
    /// used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately sent to a worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: BoxedTask<R>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks to free workers, oldest first, until the queue is empty or
    /// every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Worker is gone, keep the task and stop
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Collects task outcomes according to `policy`.
    ///
    /// With [`DrainPolicy::JoinAll`] this returns only once every published task has
    /// been collected (or its worker has disconnected). With [`DrainPolicy::Poll`] it
    /// never blocks.
    pub fn drain(&mut self, policy: DrainPolicy) -> DrainedTasks<R> {
        let mut drained = DrainedTasks::default();

        loop {
            self.collect_ready(&mut drained);
            self.process_queued_tasks();

            if policy == DrainPolicy::Poll || self.is_idle() {
                break;
            }

            let Some(worker) = self
                .channels
                .iter()
                .position(|channel| channel.num_tasks_in_flight > 0)
            else {
                warn!(
                    "{} queued task(s) cannot be scheduled, no worker is accepting tasks",
                    self.queued_tasks.len()
                );
                break;
            };

            let outcome = self.channels[worker].result_receiver.recv();
            self.record_outcome(worker, outcome, &mut drained);
        }

        drained
    }

    /// Takes every outcome that is already waiting, without blocking.
    fn collect_ready(&mut self, drained: &mut DrainedTasks<R>) {
        for worker in 0..self.channels.len() {
            loop {
                match self.channels[worker].result_receiver.try_recv() {
                    Ok(outcome) => self.record_outcome(worker, Ok(outcome), drained),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.record_outcome(worker, Err(RecvError), drained);
                        break;
                    }
                }
            }
        }
    }

    fn record_outcome(
        &mut self,
        worker: usize,
        outcome: Result<WorkerOutcome<R>, RecvError>,
        drained: &mut DrainedTasks<R>,
    ) {
        let channel = &mut self.channels[worker];
        match outcome {
            Ok(Ok(result)) => {
                channel.num_tasks_in_flight -= 1;
                drained.results.push(result);
            }
            Ok(Err(failure)) => {
                channel.num_tasks_in_flight -= 1;
                drained.failures.push(TaskError::Panicked {
                    worker,
                    task: failure.task,
                    target: failure.target,
                    message: failure.message,
                });
            }
            Err(RecvError) => {
                if channel.num_tasks_in_flight > 0 {
                    drained.failures.push(TaskError::WorkerDisconnected {
                        worker,
                        in_flight: channel.num_tasks_in_flight,
                    });
                    channel.num_tasks_in_flight = 0;
                }
            }
        }
    }
}

impl<R> Drop for TaskManager<R> {
    fn drop(&mut self) {
        for channel in self.channels.drain(..) {
            let TaskChannel {
                task_sender,
                result_receiver,
                worker,
                ..
            } = channel;
            // Closing both ends lets the worker finish its current task and exit
            drop(task_sender);
            drop(result_receiver);
            if worker.join().is_err() {
                warn!("Worker thread exited with a panic");
            }
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use cgmath::Point2;

    use super::task::{JobKind, Task};
    use super::*;

    struct SquareTask(u32);

    impl Task<u32> for SquareTask {
        fn describe(&self) -> String {
            format!("square {}", self.0)
        }

        fn process(self: Box<Self>) -> u32 {
            self.0 * self.0
        }
    }

    struct PanickingTask;

    impl Task<u32> for PanickingTask {
        fn describe(&self) -> String {
            "always panics".to_string()
        }

        fn target(&self) -> Option<TaskTarget> {
            Some(TaskTarget {
                kind: JobKind::Meshing,
                position: Point2::new(4, -2),
            })
        }

        fn process(self: Box<Self>) -> u32 {
            panic!("boom")
        }
    }

    struct CountingTask(Arc<AtomicUsize>);

    impl Task<u32> for CountingTask {
        fn describe(&self) -> String {
            "count".to_string()
        }

        fn process(self: Box<Self>) -> u32 {
            self.0.fetch_add(1, Ordering::SeqCst) as u32
        }
    }

    #[test]
    fn join_all_collects_every_result() {
        let mut manager = TaskManager::new(2).unwrap();
        for value in 0..10 {
            manager.publish_task(Box::new(SquareTask(value)));
        }
        assert!(manager.queued_task_count() > 0);

        let drained = manager.drain(DrainPolicy::JoinAll);
        let mut results = drained.results;
        results.sort_unstable();
        assert_eq!(results, (0..10).map(|v| v * v).collect::<Vec<_>>());
        assert!(drained.failures.is_empty());
        assert!(manager.is_idle());
    }

    #[test]
    fn panics_are_reported_and_workers_survive() {
        let mut manager = TaskManager::new(1).unwrap();
        manager.publish_task(Box::new(PanickingTask));
        manager.publish_task(Box::new(SquareTask(3)));

        let drained = manager.drain(DrainPolicy::JoinAll);
        assert_eq!(drained.results, vec![9]);
        assert_eq!(drained.failures.len(), 1);
        match &drained.failures[0] {
            TaskError::Panicked {
                task,
                target,
                message,
                ..
            } => {
                assert_eq!(task, "always panics");
                assert_eq!(message, "boom");
                assert_eq!(
                    *target,
                    Some(TaskTarget {
                        kind: JobKind::Meshing,
                        position: Point2::new(4, -2),
                    })
                );
            }
            other => panic!("unexpected failure {other:?}"),
        }
    }

    #[test]
    fn poll_eventually_collects_everything() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(3).unwrap();
        for _ in 0..6 {
            manager.publish_task(Box::new(CountingTask(counter.clone())));
        }

        let mut collected = 0;
        while !manager.is_idle() {
            let drained = manager.drain(DrainPolicy::Poll);
            assert!(drained.failures.is_empty());
            collected += drained.results.len();
            thread::yield_now();
        }
        assert_eq!(collected, 6);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn round_robin_spreads_tasks() {
        let mut manager = TaskManager::new(3).unwrap();
        for value in 0..3 {
            assert!(manager.publish_task(Box::new(SquareTask(value))));
        }
        assert_eq!(manager.tasks_in_flight(), 3);
        assert!(!manager.publish_task(Box::new(SquareTask(9))));
        manager.drain(DrainPolicy::JoinAll);
    }
}
