use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::assign::{AssignError, SelectionError};
use crate::roster::RosterError;
use crate::schedule::{MoveError, ScoreEntryError};
use crate::service::ServiceError;

/// Everything a request handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Assign(#[from] AssignError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    ScoreEntry(#[from] ScoreEntryError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("could not export leaderboard: {0}")]
    Export(#[from] csv::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("no setup in progress for tournament {0}")]
    NoSetup(String),
}

impl AppError {
    /// Status reported by the scheduling service, when it answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Service(ServiceError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Service(_) => StatusCode::BAD_GATEWAY,
            AppError::NoSetup(_) => StatusCode::NOT_FOUND,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let Some(status) = self.upstream_status() {
            body["upstreamStatus"] = json!(status);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_failures_are_bad_requests() {
        assert_eq!(AppError::from(MoveError::SameTeam).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(AssignError::EmptyName).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NoSetup("t1".into()).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failures_keep_status_and_message() {
        let err = AppError::from(ServiceError::Status {
            status: 409,
            message: "player already on team2".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.upstream_status(), Some(409));
        assert!(err.to_string().contains("player already on team2"));
        assert_eq!(err.error_response().status(), StatusCode::BAD_GATEWAY);
    }
}
