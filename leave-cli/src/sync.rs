//! Best-effort mirroring of the team snapshot to a remote HTTP endpoint.
//!
//! The endpoint speaks a tiny action protocol: a save is a POST of
//! `{ "action": "save", "data": <snapshot> }`, a load is a GET with `?action=load` that
//! answers `{ "data": <snapshot> }`. Any failure leaves the local copy authoritative.

use anyhow::{Context, Result};
use leave_core::TeamData;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint returned {0}")]
    Status(StatusCode),
    #[error("endpoint answered with an unreadable snapshot: {0}")]
    Body(String),
}

#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    Pushed,
    Pulled(Box<TeamData>),
    /// The endpoint could not be used; local data stays as it is.
    LocalOnly,
}

#[derive(Serialize)]
struct SaveRequest<'a> {
    action: &'static str,
    data: &'a TeamData,
}

#[derive(Deserialize)]
struct LoadResponse {
    data: TeamData,
}

#[derive(Debug, Clone)]
pub struct SyncClient {
    client: Client,
    endpoint: String,
}

impl SyncClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub async fn push(&self, data: &TeamData) -> SyncOutcome {
        match self.try_push(data).await {
            Ok(()) => {
                info!(endpoint = %self.endpoint, "pushed team data");
                SyncOutcome::Pushed
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "sync push failed, keeping local data only");
                SyncOutcome::LocalOnly
            }
        }
    }

    pub async fn pull(&self) -> SyncOutcome {
        match self.try_pull().await {
            Ok(data) => {
                info!(endpoint = %self.endpoint, members = data.members().len(), "pulled team data");
                SyncOutcome::Pulled(Box::new(data))
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "sync pull failed, using local data");
                SyncOutcome::LocalOnly
            }
        }
    }

    async fn try_push(&self, data: &TeamData) -> Result<(), SyncError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&SaveRequest {
                action: "save",
                data,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status()));
        }
        Ok(())
    }

    async fn try_pull(&self) -> Result<TeamData, SyncError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("action", "load")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status()));
        }
        let body = resp.text().await?;
        let loaded: LoadResponse =
            serde_json::from_str(&body).map_err(|e| SyncError::Body(e.to_string()))?;
        Ok(loaded.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leave_core::LeaveType;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SyncClient {
        SyncClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn push_posts_save_action_with_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "action": "save",
                "data": { "members": ["Alice"] }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server)
            .push(&TeamData::with_members(["Alice"]))
            .await;
        assert_eq!(outcome, SyncOutcome::Pushed);
    }

    #[tokio::test]
    async fn push_falls_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = client(&server).push(&TeamData::new()).await;
        assert_eq!(outcome, SyncOutcome::LocalOnly);
    }

    #[tokio::test]
    async fn pull_reads_and_normalises_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "members": ["Alice"],
                    "leaveData": { "Alice": { "2024-03": [4] } }
                }
            })))
            .mount(&server)
            .await;

        let SyncOutcome::Pulled(data) = client(&server).pull().await else {
            panic!("expected pulled data");
        };
        assert_eq!(data.members(), ["Alice"]);
        let march = data.leave().month_for("Alice", 2024, 3).unwrap();
        assert_eq!(march.get(4), Some(LeaveType::Full));
    }

    #[tokio::test]
    async fn pull_falls_back_on_unreadable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        assert_eq!(client(&server).pull().await, SyncOutcome::LocalOnly);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_local_only() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = SyncClient::new(&uri, Duration::from_secs(2)).unwrap();
        assert_eq!(client.push(&TeamData::new()).await, SyncOutcome::LocalOnly);
        assert_eq!(client.pull().await, SyncOutcome::LocalOnly);
    }
}
