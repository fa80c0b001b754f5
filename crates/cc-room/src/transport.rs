use cc_dto::rpc::{bye, hello, job, update};
use cc_dto::{ApiError, CodedError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RoomError;

/// Thin JSON-over-HTTP client for the keeper's four-verb RPC surface
/// (spec.md §6). Knows nothing about retries or backoff; callers own that.
pub struct RoomTransport {
    client: reqwest::Client,
    base_url: String,
}

impl RoomTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn hello(&self, req: &hello::Request) -> Result<hello::Response, RoomError> {
        self.post("hello", req).await
    }

    pub async fn job(&self, req: &job::Request) -> Result<job::Response, RoomError> {
        self.post("job", req).await
    }

    pub async fn update(&self, req: &update::Request) -> Result<update::Response, RoomError> {
        self.post("update", req).await
    }

    pub async fn bye(&self, req: &bye::Request) -> Result<bye::Response, RoomError> {
        self.post("bye", req).await
    }

    async fn post<Req: Serialize + ?Sized, Res: DeserializeOwned>(&self, verb: &str, req: &Req) -> Result<Res, RoomError> {
        let url = format!("{}/{verb}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|err| RoomError::Transport(err.to_string()))?;

        if resp.status().is_success() {
            resp.json::<Res>().await.map_err(|err| RoomError::Transport(err.to_string()))
        } else {
            match resp.json::<CodedError>().await {
                Ok(coded) => Err(RoomError::Api(ApiError::from(coded))),
                Err(err) => Err(RoomError::Transport(err.to_string())),
            }
        }
    }
}
