//! Client for the remote scheduling/persistence service.
//!
//! Every call is a single attempt. Only the move request carries a timeout.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};

use crate::assign::buckets::FinalizePayload;
use crate::roster::{parse_roster, Player};
use crate::schedule::{MoveRequest, SaveScoresRequest, Schedule, ScoresDocument};
use crate::standings::SaveWithdrawalsRequest;

static SHARE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"schedules/([a-f0-9\-]+)\.json").expect("share id pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("scheduling service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx reply; message taken verbatim from the body
    #[error("scheduling service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("scheduling service sent unreadable JSON: {0}")]
    Decode(#[from] serde_json::Error),
    /// 2xx reply that reports `success: false`
    #[error("{0}")]
    Rejected(String),
}

/// Result of saving a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSchedule {
    pub url: String,
    pub share_id: Option<String>,
}

#[derive(Clone)]
pub struct SchedulerClient {
    http: Client,
    base_url: String,
    move_timeout: Duration,
}

impl SchedulerClient {
    pub fn new(base_url: &str, move_timeout: Duration) -> Result<Self, ServiceError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            move_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(decode_document(&text)?)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ServiceError> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<Value, ServiceError> {
        let url = self.url(path);
        log::debug!("POST {}", url);
        let mut request = self.http.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        self.send(request).await
    }

    /// Draft schedule as generated, before players are assigned
    pub async fn draft_schedule(&self, tournament_id: &str) -> Result<Value, ServiceError> {
        self.get_json(&format!("view-schedule/{}", tournament_id)).await
    }

    pub async fn finalized_schedule(&self, tournament_id: &str) -> Result<Schedule, ServiceError> {
        let doc = self
            .get_json(&format!("view-finalized-schedule/{}", tournament_id))
            .await?;
        Ok(Schedule::from_document(&doc))
    }

    pub async fn scores(&self, tournament_id: &str) -> Result<ScoresDocument, ServiceError> {
        let doc = self.get_json(&format!("get-scores/{}", tournament_id)).await?;
        Ok(ScoresDocument::from_document(&doc))
    }

    pub async fn save_scores(
        &self,
        tournament_id: &str,
        request: &SaveScoresRequest,
    ) -> Result<(), ServiceError> {
        self.post_json(&format!("save-scores/{}", tournament_id), request, None)
            .await?;
        Ok(())
    }

    pub async fn save_withdrawals(
        &self,
        tournament_id: &str,
        request: &SaveWithdrawalsRequest,
    ) -> Result<(), ServiceError> {
        self.post_json(&format!("save-withdrawals/{}", tournament_id), request, None)
            .await?;
        Ok(())
    }

    /// Asks the service to move a player. The reply body is ignored; callers re-fetch the schedule.
    pub async fn move_player(
        &self,
        tournament_id: &str,
        request: &MoveRequest,
    ) -> Result<(), ServiceError> {
        self.post_json(
            &format!("move-player/{}", tournament_id),
            request,
            Some(self.move_timeout),
        )
        .await?;
        Ok(())
    }

    pub async fn roster(&self, organization: &str) -> Result<Vec<Player>, ServiceError> {
        let doc = self.get_json(&format!("roster/{}", organization)).await?;
        Ok(parse_roster(&doc))
    }

    pub async fn finalize_schedule(
        &self,
        tournament_id: &str,
        payload: &FinalizePayload<'_>,
    ) -> Result<Schedule, ServiceError> {
        let doc = self
            .post_json(&format!("finalize-schedule/{}", tournament_id), payload, None)
            .await?;
        Ok(Schedule::from_document(&doc))
    }

    /// Schedule-first generation; the raw document is returned so it can be saved as-is.
    pub async fn generate_schedule(
        &self,
        total_players: usize,
        a_players: usize,
    ) -> Result<Value, ServiceError> {
        self.get_json(&format!(
            "schedule/totalplayers/{}/aplayers/{}",
            total_players, a_players
        ))
        .await
    }

    pub async fn save_schedule(&self, schedule: &Value) -> Result<SavedSchedule, ServiceError> {
        let reply = self
            .post_json("save-schedule", &json!({ "schedule": schedule }), None)
            .await?;
        let url = reply
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ServiceError::Rejected("save-schedule reply has no url".to_string()))?
            .to_string();
        let share_id = share_id_from_url(&url);
        Ok(SavedSchedule { url, share_id })
    }

    /// Players-first generation. Returns the new schedule id.
    pub async fn generate_players_first(
        &self,
        tournament_id: &str,
        selected: &[&Player],
    ) -> Result<String, ServiceError> {
        let body = json!({
            "tournamentId": tournament_id,
            "selectedPlayers": selected,
        });
        let reply = self
            .post_json("generate-players-first-schedule", &body, None)
            .await?;

        if reply.get("success").and_then(Value::as_bool) != Some(true) {
            let message = reply
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("failed to generate tournament schedule");
            return Err(ServiceError::Rejected(message.to_string()));
        }
        reply
            .get("scheduleId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Rejected("reply has no scheduleId".to_string()))
    }
}

/// Parses a service body. Some endpoints wrap the document in a JSON string; one level is unwrapped.
pub fn decode_document(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text)? {
        Value::String(inner) => Ok(serde_json::from_str(&inner).unwrap_or(Value::String(inner))),
        doc => Ok(doc),
    }
}

/// Best human message in an error body: a plain string, or `body`, `error`, `message`.
pub fn error_message(text: &str) -> String {
    let fallback = || {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            "no response body".to_string()
        } else {
            trimmed.to_string()
        }
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(map)) => ["body", "error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(fallback),
        _ => fallback(),
    }
}

/// Share id embedded in a saved schedule's url
pub fn share_id_from_url(url: &str) -> Option<String> {
    SHARE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_wrapped_documents_are_unwrapped() {
        let wrapped = serde_json::to_string(&r#"{"round1": []}"#).unwrap();
        assert_eq!(decode_document(&wrapped).unwrap(), json!({"round1": []}));
        assert_eq!(decode_document(r#"{"round1": []}"#).unwrap(), json!({"round1": []}));
        assert_eq!(decode_document("").unwrap(), Value::Null);
        assert_eq!(decode_document(r#""plain""#).unwrap(), json!("plain"));
        assert!(decode_document("<html>").is_err());
    }

    #[test]
    fn error_bodies_surface_their_message() {
        assert_eq!(error_message(r#""bucket counts wrong""#), "bucket counts wrong");
        assert_eq!(error_message(r#"{"body": "no such schedule"}"#), "no such schedule");
        assert_eq!(error_message(r#"{"error": "boom"}"#), "boom");
        assert_eq!(error_message("Internal Server Error"), "Internal Server Error");
        assert_eq!(error_message(""), "no response body");
    }

    #[test]
    fn share_id_comes_from_the_url() {
        let url = "https://bucket.example/schedules/3f2a-bc01.json?X-Amz-Signature=abc";
        assert_eq!(share_id_from_url(url).as_deref(), Some("3f2a-bc01"));
        assert_eq!(share_id_from_url("https://bucket.example/other.json"), None);
    }
}
