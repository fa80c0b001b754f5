/// Durable shadow of a connected room (spec.md §6 persistence contract).
/// The keeper owns liveness tracking in memory; only identity and current
/// assignment are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    pub id: String,
    pub display_name: String,
    pub assigned_job_id: Option<String>,
}

impl RoomRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            assigned_job_id: None,
        }
    }
}
