use chrono::{DateTime, Utc};
use maestro_agent::{AgentId, AgentMetadata, AgentRole};
use maestro_core::{Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Task and agent lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrchestrationEvent {
    /// A task entered the graph.
    TaskCreated {
        task_id: TaskId,
        task_type: String,
        timestamp: DateTime<Utc>,
    },
    /// A task changed status.
    TaskUpdated {
        task_id: TaskId,
        status: TaskStatus,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// A new agent instance was created for a role.
    AgentSpawned {
        agent_id: AgentId,
        role: AgentRole,
        timestamp: DateTime<Utc>,
    },
    /// An agent returned a task in a terminal status.
    AgentCompleted {
        agent_id: AgentId,
        role: AgentRole,
        task_id: TaskId,
        status: TaskStatus,
        timestamp: DateTime<Utc>,
    },
}

impl OrchestrationEvent {
    /// Event for a newly submitted task.
    pub fn task_created(task: &Task) -> Self {
        Self::TaskCreated {
            task_id: task.id.clone(),
            task_type: task.task_type.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Event for a task status change.
    pub fn task_updated(task: &Task) -> Self {
        Self::TaskUpdated {
            task_id: task.id.clone(),
            status: task.status,
            error: task.error.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Event for a newly spawned agent.
    pub fn agent_spawned(agent: &AgentMetadata) -> Self {
        Self::AgentSpawned {
            agent_id: agent.id.clone(),
            role: agent.role,
            timestamp: Utc::now(),
        }
    }

    /// Event for an agent returning a task.
    pub fn agent_completed(agent: &AgentMetadata, task: &Task) -> Self {
        Self::AgentCompleted {
            agent_id: agent.id.clone(),
            role: agent.role,
            task_id: task.id.clone(),
            status: task.status,
            timestamp: Utc::now(),
        }
    }

    /// Snake-case event name, as used in the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "task_created",
            Self::TaskUpdated { .. } => "task_updated",
            Self::AgentSpawned { .. } => "agent_spawned",
            Self::AgentCompleted { .. } => "agent_completed",
        }
    }
}

/// Receiver of orchestration events.
///
/// `emit` is called from scheduler workers and must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: OrchestrationEvent);
}

/// Writes every event to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: OrchestrationEvent) {
        match &event {
            OrchestrationEvent::TaskCreated {
                task_id, task_type, ..
            } => debug!(event = event.name(), %task_id, %task_type, "Task created"),
            OrchestrationEvent::TaskUpdated {
                task_id,
                status,
                error,
                ..
            } => debug!(event = event.name(), %task_id, %status, error = ?error, "Task updated"),
            OrchestrationEvent::AgentSpawned { agent_id, role, .. } => {
                info!(event = event.name(), %agent_id, %role, "Agent spawned");
            }
            OrchestrationEvent::AgentCompleted {
                agent_id,
                task_id,
                status,
                ..
            } => debug!(event = event.name(), %agent_id, %task_id, %status, "Agent finished task"),
        }
    }
}

/// Forwards events into an unbounded channel.
///
/// Events emitted after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OrchestrationEvent>,
}

impl ChannelSink {
    /// A sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OrchestrationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: OrchestrationEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use maestro_agent::profiles;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        let mut task = Task::new("research", "r");
        sink.emit(OrchestrationEvent::task_created(&task));
        task.fail("nope");
        sink.emit(OrchestrationEvent::task_updated(&task));

        assert_eq!(rx.recv().await.unwrap().name(), "task_created");
        match rx.recv().await.unwrap() {
            OrchestrationEvent::TaskUpdated { status, error, .. } => {
                assert_eq!(status, TaskStatus::Failed);
                assert_eq!(error.as_deref(), Some("nope"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(OrchestrationEvent::task_created(&Task::new("code", "c")));
    }

    #[test]
    fn test_serialized_tag() {
        let agent = AgentMetadata::from_profile(profiles::research_profile());
        let json = serde_json::to_value(OrchestrationEvent::agent_spawned(&agent)).unwrap();
        assert_eq!(json["event"], "agent_spawned");
        assert_eq!(json["role"], "research");
        assert!(json["timestamp"].is_string());
    }
}
