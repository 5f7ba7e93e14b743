//! HTTP client for the match coordinator.
//!
//! Every call is a JSON `POST` to `{base_url}/{endpoint}` bounded by the
//! configured timeout. Callers treat every error as transient.

use crate::protocol::{
    AckResponse, JoinRequest, JoinResponse, MoveRequest, MoveResponse, StatusResponse,
    TrapRequest, UidRequest,
};
use hexrace_core::{HexCoord, JoinOutcome, MatchSnapshot, MoveAck};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("client build failed: {0}")]
    Build(String),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("coordinator returned {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("undecodable coordinator reply: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct HttpCoordinator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCoordinator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CoordinatorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CoordinatorError::Build(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, CoordinatorError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|err| CoordinatorError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoordinatorError::HttpStatus {
                code: status.as_u16(),
                body,
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|err| CoordinatorError::Decode(err.to_string()))
    }

    pub async fn join(
        &self,
        uid: &str,
        username: &str,
        category: &str,
    ) -> Result<JoinOutcome, CoordinatorError> {
        let request = JoinRequest {
            uid: uid.to_string(),
            username: username.to_string(),
            category: category.to_string(),
        };
        let response: JoinResponse = self.post("join", &request).await?;
        Ok(response.outcome())
    }

    pub async fn status(&self, uid: &str) -> Result<MatchSnapshot, CoordinatorError> {
        let request = UidRequest {
            uid: uid.to_string(),
        };
        let response: StatusResponse = self.post("status", &request).await?;
        Ok(response.into())
    }

    pub async fn send_move(
        &self,
        uid: &str,
        to: HexCoord,
        found: bool,
    ) -> Result<MoveAck, CoordinatorError> {
        let request = MoveRequest {
            uid: uid.to_string(),
            q: to.q,
            r: to.r,
            found,
        };
        let response: MoveResponse = self.post("move", &request).await?;
        Ok(response.into())
    }

    pub async fn place_trap(&self, uid: &str, at: HexCoord) -> Result<bool, CoordinatorError> {
        self.trap_call("place_trap", uid, at).await
    }

    pub async fn clear_trap(&self, uid: &str, at: HexCoord) -> Result<bool, CoordinatorError> {
        self.trap_call("clear_trap", uid, at).await
    }

    async fn trap_call(&self, endpoint: &str, uid: &str, at: HexCoord) -> Result<bool, CoordinatorError> {
        let request = TrapRequest {
            uid: uid.to_string(),
            q: at.q,
            r: at.r,
        };
        let response: AckResponse = self.post(endpoint, &request).await?;
        Ok(response.ok)
    }

    pub async fn leave(&self, uid: &str) -> Result<bool, CoordinatorError> {
        let request = UidRequest {
            uid: uid.to_string(),
        };
        let response: AckResponse = self.post("leave", &request).await?;
        Ok(response.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let coordinator =
            HttpCoordinator::new("http://127.0.0.1:8787", Duration::from_millis(100)).unwrap();
        assert_eq!(coordinator.url("status"), "http://127.0.0.1:8787/status");
    }

    #[tokio::test]
    async fn test_unreachable_coordinator_is_an_error() {
        // Port 9 (discard) is closed on test hosts
        let coordinator =
            HttpCoordinator::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = coordinator.status("nobody").await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Http(_)));
    }
}
