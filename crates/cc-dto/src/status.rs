use serde::{Deserialize, Serialize};

/// Terminal disposition of a [`crate::RunningJob`] (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum JobStatus {
    Unknown,
    Running,
    Succeeded,
    Aborted(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Aborted(_) | JobStatus::Failed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_and_unknown_are_not_finished() {
        assert!(!JobStatus::Unknown.is_finished());
        assert!(!JobStatus::Running.is_finished());
    }

    #[test]
    fn terminal_variants_are_finished() {
        assert!(JobStatus::Succeeded.is_finished());
        assert!(JobStatus::Aborted("room stopped".into()).is_finished());
        assert!(JobStatus::Failed("engine crashed".into()).is_finished());
    }
}
