/// Errors raised by the contest scheduler (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("no such contest: {0}")]
    NoSuchContest(String),
    #[error("contest {0} is already terminal")]
    ContestTerminal(String),
    #[error("no such job: {0}")]
    NoSuchJob(String),
    #[error("job {0} is already finalized")]
    JobAlreadyFinal(String),
    #[error("wait cancelled")]
    Cancelled,
    #[error("persistence error: {0}")]
    Persistence(String),
}
