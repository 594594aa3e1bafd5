use crate::config::OrchestratorConfig;
use crate::events::{EventSink, OrchestrationEvent};
use crate::registry::AgentRegistry;
use crate::router::RoleRouter;
use crate::task_queue::TaskQueue;
use futures_util::future::join_all;
use maestro_core::{MaestroError, MaestroResult, Task, TaskId, TaskStatus};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, error, info, warn};

/// Result of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The task had not started and is now cancelled.
    Cancelled,
    /// The task is executing; it runs to completion and keeps its result.
    AlreadyRunning,
    /// The task was already terminal.
    AlreadyFinished,
    /// No task with that id.
    NotFound,
}

/// Summary of one scheduler run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Every task in submission order, all terminal.
    pub tasks: Vec<Task>,
    /// Number of batches executed.
    pub batches: usize,
    /// True when unfinished tasks had to be failed because none could become ready.
    pub deadlocked: bool,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

impl RunReport {
    /// Number of tasks that ended in `status`.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

/// Executes a task graph in batches.
///
/// Each iteration snapshots every ready task and runs the batch
/// concurrently, one tokio task per graph task. A worker first takes its
/// role's agent, then one of `max_concurrent_tasks` permits, and only then
/// marks the task executing. Until that point the task is idle and can be
/// cancelled. The next batch starts once the whole batch has finished.
/// Failures, timeouts and panics are recorded on the task; they never abort
/// the run.
pub struct Scheduler {
    queue: Arc<RwLock<TaskQueue>>,
    registry: Arc<AgentRegistry>,
    router: Arc<RoleRouter>,
    events: Arc<dyn EventSink>,
    config: OrchestratorConfig,
}

impl Scheduler {
    /// A scheduler with an empty graph.
    pub fn new(
        registry: Arc<AgentRegistry>,
        router: RoleRouter,
        events: Arc<dyn EventSink>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            queue: Arc::new(RwLock::new(TaskQueue::new())),
            registry,
            router: Arc::new(router),
            events,
            config,
        }
    }

    /// Add tasks to the graph.
    ///
    /// Self-dependencies and duplicate ids reject the whole submission.
    pub async fn submit(&self, tasks: Vec<Task>) -> MaestroResult<Vec<TaskId>> {
        let created: Vec<OrchestrationEvent> =
            tasks.iter().map(OrchestrationEvent::task_created).collect();
        let ids = self.queue.write().await.submit(tasks)?;
        for event in created {
            self.events.emit(event);
        }
        debug!(count = ids.len(), "Tasks submitted");
        Ok(ids)
    }

    /// Cancel a task that has not started yet.
    ///
    /// This includes a task in the current batch that is still waiting for
    /// its agent or a permit. A cancelled task counts as finished, so its
    /// dependents still run.
    pub async fn cancel(&self, id: &TaskId) -> CancelOutcome {
        let mut queue = self.queue.write().await;
        let Some(status) = queue.get(id).map(|t| t.status) else {
            return CancelOutcome::NotFound;
        };
        match status {
            TaskStatus::Idle => {
                queue.cancel(id);
                if let Some(task) = queue.get(id) {
                    self.events.emit(OrchestrationEvent::task_updated(task));
                }
                info!(task_id = %id, "Task cancelled");
                CancelOutcome::Cancelled
            }
            TaskStatus::Executing => {
                warn!(task_id = %id, "Cannot cancel a task that is already executing");
                CancelOutcome::AlreadyRunning
            }
            _ => CancelOutcome::AlreadyFinished,
        }
    }

    /// Current state of one task.
    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        self.queue.read().await.get(id).cloned()
    }

    /// Snapshot of every task in submission order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.queue.read().await.all_tasks().into_iter().cloned().collect()
    }

    /// Run until every task is terminal.
    ///
    /// If no task is ready while some are unfinished, the remaining tasks are
    /// failed with a deadlock error naming whether a dependency cycle exists,
    /// and the report is flagged `deadlocked`.
    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        let mut batches = 0;
        let mut deadlocked = false;

        loop {
            let batch = {
                let mut queue = self.queue.write().await;
                if queue.is_done() {
                    break;
                }
                let batch = queue.take_ready();
                if batch.is_empty() {
                    self.fail_deadlocked(&mut queue);
                    deadlocked = true;
                    break;
                }
                batch
            };

            batches += 1;
            info!(batch = batches, size = batch.len(), "Executing batch");

            let finished = self.execute_batch(batch).await;

            let mut queue = self.queue.write().await;
            for task in finished {
                let event = OrchestrationEvent::task_updated(&task);
                // Tasks cancelled while waiting keep their cancelled state.
                if queue.finish(task) {
                    self.events.emit(event);
                }
            }
        }

        let tasks = self.tasks().await;
        let report = RunReport {
            batches,
            deadlocked,
            duration_ms: started.elapsed().as_millis() as u64,
            tasks,
        };
        info!(
            batches,
            completed = report.count(TaskStatus::Completed),
            failed = report.count(TaskStatus::Failed),
            cancelled = report.count(TaskStatus::Cancelled),
            duration_ms = report.duration_ms,
            "Run finished"
        );
        report
    }

    fn fail_deadlocked(&self, queue: &mut TaskQueue) {
        let remaining = queue.total_count() - queue.finished_count();
        let cause = if queue.has_cycle() {
            "dependency cycle detected"
        } else {
            "unresolvable dependency"
        };
        let reason = format!("{} ({cause})", MaestroError::GraphDeadlock { remaining });
        error!(remaining, cause, "No task is ready; failing the rest of the graph");

        for id in queue.fail_remaining(&reason) {
            if let Some(task) = queue.get(&id) {
                self.events.emit(OrchestrationEvent::task_updated(task));
            }
        }
    }

    async fn execute_batch(&self, batch: Vec<Task>) -> Vec<Task> {
        let limit = self
            .config
            .max_concurrent_tasks
            .clamp(1, Semaphore::MAX_PERMITS);
        let permits = Arc::new(Semaphore::new(limit));
        let timeout = self.config.task_timeout();

        let mut fallbacks = Vec::with_capacity(batch.len());
        let mut handles = Vec::with_capacity(batch.len());
        for task in batch {
            fallbacks.push(task.clone());
            let worker = Worker {
                queue: Arc::clone(&self.queue),
                registry: Arc::clone(&self.registry),
                router: Arc::clone(&self.router),
                events: Arc::clone(&self.events),
                permits: Arc::clone(&permits),
                timeout,
            };
            handles.push(tokio::spawn(worker.execute(task)));
        }

        join_all(handles)
            .await
            .into_iter()
            .zip(fallbacks)
            .map(|(joined, mut fallback)| match joined {
                Ok(task) => task,
                Err(e) => {
                    error!(task_id = %fallback.id, error = %e, "Task worker aborted");
                    fallback.fail(
                        MaestroError::Execution(format!("worker aborted: {e}")).to_string(),
                    );
                    fallback
                }
            })
            .collect()
    }
}

/// What a spawned worker needs to execute one task.
struct Worker {
    queue: Arc<RwLock<TaskQueue>>,
    registry: Arc<AgentRegistry>,
    router: Arc<RoleRouter>,
    events: Arc<dyn EventSink>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl Worker {
    async fn execute(self, mut task: Task) -> Task {
        let role = match self.router.resolve(&task.task_type) {
            Ok(role) => role,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Task not routable");
                task.fail(e.to_string());
                return task;
            }
        };
        let agent = match self.registry.acquire(role).await {
            Ok((agent, spawned)) => {
                if spawned {
                    let agent = agent.lock().await;
                    self.events
                        .emit(OrchestrationEvent::agent_spawned(agent.metadata()));
                }
                agent
            }
            Err(e) => {
                warn!(task_id = %task.id, %role, error = %e, "No agent for task");
                task.fail(e.to_string());
                return task;
            }
        };

        // Exclusive use of the role's agent for the whole task. The permit is
        // taken only once the agent is held, so a task queued behind a busy
        // agent never blocks another role.
        let mut agent = agent.lock().await;
        // The semaphore is never closed.
        let _permit = Arc::clone(&self.permits).acquire_owned().await.ok();

        {
            let mut queue = self.queue.write().await;
            if !queue.start(&task.id) {
                debug!(task_id = %task.id, "Task cancelled before it started");
                return queue.get(&task.id).cloned().unwrap_or(task);
            }
            if let Some(started) = queue.get(&task.id) {
                self.events.emit(OrchestrationEvent::task_updated(started));
            }
        }

        let mut fallback = task.clone();
        fallback.mark_started();
        let outcome = tokio::time::timeout(self.timeout, agent.run(task)).await;
        let done = match outcome {
            Ok(done) => done,
            Err(_) => {
                let secs = self.timeout.as_secs();
                warn!(task_id = %fallback.id, agent = agent.name(), secs, "Task timed out");
                fallback.fail(MaestroError::Timeout(secs).to_string());
                fallback
            }
        };
        self.events
            .emit(OrchestrationEvent::agent_completed(agent.metadata(), &done));
        done
    }
}
