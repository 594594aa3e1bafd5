use maestro_core::{MaestroError, MaestroResult, Task, TaskId, TaskStatus};
use std::collections::{HashMap, HashSet};

/// A task graph with dependency resolution.
///
/// Tasks are kept in submission order. A task is ready once it is idle and
/// every dependency has reached a terminal status; completed, failed and
/// cancelled dependencies all count as finished.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    finished: HashSet<TaskId>,
}

impl TaskQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task without structural checks.
    pub fn add(&mut self, task: Task) -> TaskId {
        let id = task.id.clone();
        if task.is_terminal() {
            self.finished.insert(id.clone());
        }
        if self.tasks.insert(id.clone(), task).is_none() {
            self.order.push(id.clone());
        }
        id
    }

    /// Add a batch of tasks, rejecting self-loops and duplicate ids.
    ///
    /// Nothing is added when any task in the batch is rejected. Dependencies
    /// on ids that are never submitted are accepted here and surface later
    /// as a deadlock.
    pub fn submit(&mut self, tasks: Vec<Task>) -> MaestroResult<Vec<TaskId>> {
        let mut incoming = HashSet::new();
        for task in &tasks {
            if task.has_self_dependency() {
                return Err(MaestroError::InvalidGraph(format!(
                    "task {} depends on itself",
                    task.id
                )));
            }
            if self.tasks.contains_key(&task.id) || !incoming.insert(&task.id) {
                return Err(MaestroError::InvalidGraph(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
        }
        Ok(tasks.into_iter().map(|t| self.add(t)).collect())
    }

    /// All ready tasks, highest priority first, then submission order.
    pub fn all_ready(&self) -> Vec<&Task> {
        let mut ready: Vec<&Task> = self
            .order
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .filter(|t| t.is_ready(&self.finished))
            .collect();
        // Stable sort keeps submission order among equal priorities.
        ready.sort_by(|a, b| b.priority.cmp(&a.priority));
        ready
    }

    /// Snapshot every ready task for execution.
    ///
    /// The tasks stay idle in the queue until a worker calls [`start`], so a
    /// task still waiting for its agent can be cancelled.
    ///
    /// [`start`]: TaskQueue::start
    pub fn take_ready(&self) -> Vec<Task> {
        self.all_ready().into_iter().cloned().collect()
    }

    /// Move an idle task to executing. Returns `false` when the task is
    /// unknown or no longer idle, e.g. cancelled while it waited.
    pub fn start(&mut self, id: &TaskId) -> bool {
        match self.tasks.get_mut(id) {
            Some(task) if task.status == TaskStatus::Idle => {
                task.mark_started();
                true
            }
            _ => false,
        }
    }

    /// Store the terminal form of a task returned by a worker.
    ///
    /// Returns `false` and keeps the queued task when the returned task is
    /// not terminal or the queued one already is.
    pub fn finish(&mut self, task: Task) -> bool {
        if !task.is_terminal()
            || !self.tasks.contains_key(&task.id)
            || self.finished.contains(&task.id)
        {
            return false;
        }
        self.finished.insert(task.id.clone());
        self.tasks.insert(task.id.clone(), task);
        true
    }

    /// Mark a task as completed with the given result.
    pub fn mark_completed(&mut self, id: &TaskId, result: serde_json::Value) -> bool {
        self.transition(id, |t| t.complete(result))
    }

    /// Mark a task as failed.
    pub fn mark_failed(&mut self, id: &TaskId, reason: impl Into<String>) -> bool {
        self.transition(id, |t| t.fail(reason))
    }

    /// Cancel a task that has not started. Returns `false` when the task is
    /// unknown, executing or already terminal.
    pub fn cancel(&mut self, id: &TaskId) -> bool {
        match self.tasks.get_mut(id) {
            Some(task) if task.status == TaskStatus::Idle => {
                task.cancel();
                self.finished.insert(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Fail every unfinished task with `reason`, returning their ids.
    pub fn fail_remaining(&mut self, reason: &str) -> Vec<TaskId> {
        let remaining: Vec<TaskId> = self
            .order
            .iter()
            .filter(|id| !self.finished.contains(*id))
            .cloned()
            .collect();
        for id in &remaining {
            self.mark_failed(id, reason);
        }
        remaining
    }

    fn transition(&mut self, id: &TaskId, apply: impl FnOnce(&mut Task)) -> bool {
        if let Some(task) = self.tasks.get_mut(id) {
            apply(task);
            self.finished.insert(id.clone());
            true
        } else {
            false
        }
    }

    /// Look up a task by id.
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// All tasks in submission order.
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id)).collect()
    }

    /// Count of tasks in a terminal status.
    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }

    /// Count of all tasks.
    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }

    /// True when every task is terminal.
    pub fn is_done(&self) -> bool {
        self.finished.len() == self.tasks.len()
    }

    /// Check for cycles in the dependency graph.
    pub fn has_cycle(&self) -> bool {
        let mut visited = HashMap::new();
        self.order
            .iter()
            .any(|id| self.dfs_cycle(id, &mut visited))
    }

    fn dfs_cycle<'a>(&'a self, id: &'a TaskId, visited: &mut HashMap<&'a TaskId, u8>) -> bool {
        match visited.get(id) {
            Some(1) => return true,  // back edge
            Some(2) => return false, // done
            _ => {}
        }
        visited.insert(id, 1);
        if let Some(task) = self.tasks.get(id) {
            for dep in &task.depends_on {
                if self.dfs_cycle(dep, visited) {
                    return true;
                }
            }
        }
        visited.insert(id, 2);
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(id: &str) -> Task {
        Task::new("research", id).with_id(id)
    }

    #[test]
    fn test_empty_queue() {
        let queue = TaskQueue::new();
        assert_eq!(queue.total_count(), 0);
        assert!(queue.is_done());
        assert!(queue.all_ready().is_empty());
    }

    #[test]
    fn test_dependency_chain() {
        let mut queue = TaskQueue::new();
        queue.add(task("a"));
        queue.add(task("b").with_dependencies(vec!["a".into()]));
        queue.add(task("c").with_dependencies(vec!["a".into(), "b".into()]));

        let ready = queue.take_ready();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id.as_str(), "a");
        assert!(queue.start(&"a".into()));
        assert_eq!(queue.get(&"a".into()).unwrap().status, TaskStatus::Executing);
        assert!(queue.get(&"a".into()).unwrap().started_at.is_some());
        assert!(queue.all_ready().is_empty());

        queue.mark_completed(&"a".into(), json!(1));
        assert_eq!(queue.all_ready()[0].id.as_str(), "b");

        queue.mark_failed(&"b".into(), "boom");
        // A failed dependency still counts as finished.
        assert_eq!(queue.all_ready()[0].id.as_str(), "c");
    }

    #[test]
    fn test_ready_ordered_by_priority_then_submission() {
        let mut queue = TaskQueue::new();
        queue.add(task("low").with_priority(1));
        queue.add(task("first_high").with_priority(9));
        queue.add(task("second_high").with_priority(9));

        let ids: Vec<&str> = queue.all_ready().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["first_high", "second_high", "low"]);
    }

    #[test]
    fn test_submit_rejects_self_loop() {
        let mut queue = TaskQueue::new();
        let err = queue
            .submit(vec![task("ok"), task("a").with_dependencies(vec!["a".into()])])
            .unwrap_err();
        assert!(matches!(err, MaestroError::InvalidGraph(_)));
        assert_eq!(queue.total_count(), 0);
    }

    #[test]
    fn test_submit_rejects_duplicates() {
        let mut queue = TaskQueue::new();
        assert!(queue.submit(vec![task("a"), task("a")]).is_err());
        queue.submit(vec![task("a")]).unwrap();
        assert!(queue.submit(vec![task("a")]).is_err());
    }

    #[test]
    fn test_cancel_only_idle() {
        let mut queue = TaskQueue::new();
        queue.add(task("a"));
        queue.add(task("b"));
        queue.start(&"a".into());
        queue.add(task("c"));

        assert!(!queue.cancel(&"a".into()));
        assert!(queue.cancel(&"c".into()));
        assert!(!queue.cancel(&"c".into()));
        assert!(!queue.cancel(&"missing".into()));
        assert_eq!(queue.get(&"c".into()).unwrap().status, TaskStatus::Cancelled);
        assert_eq!(queue.finished_count(), 1);
    }

    #[test]
    fn test_finish_ignores_non_terminal() {
        let mut queue = TaskQueue::new();
        queue.add(task("a"));
        let mut claimed = queue.take_ready().remove(0);
        assert!(!queue.finish(claimed.clone()));

        claimed.complete(json!("done"));
        assert!(queue.finish(claimed));
        assert!(queue.is_done());
    }

    #[test]
    fn test_cancelled_while_waiting_is_not_started_or_overwritten() {
        let mut queue = TaskQueue::new();
        queue.add(task("a"));
        let mut claimed = queue.take_ready().remove(0);
        assert_eq!(queue.get(&"a".into()).unwrap().status, TaskStatus::Idle);

        assert!(queue.cancel(&"a".into()));
        assert!(!queue.start(&"a".into()));

        claimed.fail("late failure");
        assert!(!queue.finish(claimed));
        assert_eq!(queue.get(&"a".into()).unwrap().status, TaskStatus::Cancelled);
    }

    #[test]
    fn test_cycle_detection() {
        let mut queue = TaskQueue::new();
        queue.add(task("a").with_dependencies(vec!["b".into()]));
        queue.add(task("b").with_dependencies(vec!["a".into()]));
        assert!(queue.has_cycle());
        assert!(queue.all_ready().is_empty());
    }

    #[test]
    fn test_missing_dependency_is_not_a_cycle() {
        let mut queue = TaskQueue::new();
        queue.add(task("a").with_dependencies(vec!["ghost".into()]));
        assert!(!queue.has_cycle());
        assert!(queue.all_ready().is_empty());
    }

    #[test]
    fn test_fail_remaining() {
        let mut queue = TaskQueue::new();
        queue.add(task("done"));
        queue.add(task("x").with_dependencies(vec!["y".into()]));
        queue.add(task("y").with_dependencies(vec!["x".into()]));
        queue.mark_completed(&"done".into(), json!(null));

        let failed = queue.fail_remaining("stuck");
        assert_eq!(failed.len(), 2);
        assert!(queue.is_done());
        assert_eq!(queue.get(&"x".into()).unwrap().error.as_deref(), Some("stuck"));
        assert_eq!(queue.get(&"done".into()).unwrap().status, TaskStatus::Completed);
    }
}
