use cc_core::Timestamp;
use cc_delta::{JobCursor, JobState};
use serde::{Deserialize, Serialize};

use crate::job::Job;

pub mod hello {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Request {
        pub supported_proto_versions: Vec<i32>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Response {
        pub room_id: String,
        pub proto_version: i32,
    }
}

pub mod job {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Request {
        pub room_id: String,
        /// Long-poll budget, in nanoseconds.
        pub timeout: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Response {
        pub job: Job,
    }
}

pub mod update {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Request {
        pub room_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub job_id: Option<String>,
        pub from: JobCursor,
        pub delta: JobState,
        pub timestamp: Timestamp,
        pub done: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct Response {}
}

pub mod bye {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Request {
        pub room_id: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct Response {}
}
