use serde::Serialize;
use uuid::Uuid;

/// Events that change a job's rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// An application of `job_id` reached `completed`, or a completed
    /// application's final score changed. The whole job is re-ranked.
    ApplicationCompleted { job_id: Uuid, application_id: Uuid },
    /// Explicit re-rank request with no triggering application.
    RankRefresh { job_id: Uuid },
}

impl PipelineEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            PipelineEvent::ApplicationCompleted { job_id, .. } => *job_id,
            PipelineEvent::RankRefresh { job_id } => *job_id,
        }
    }
}
