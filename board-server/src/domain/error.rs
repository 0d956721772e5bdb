use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{field} exceeds {limit} characters")]
    TooLong { field: &'static str, limit: usize },
    #[error("post not found: {0}")]
    PostNotFound(u64),
    #[error("comment not found: {0}")]
    CommentNotFound(u64),
    #[error("wrong deletion secret")]
    WrongSecret,
    #[error("rate limit exceeded for {0}")]
    RateLimited(&'static str),
    #[error("media write failed: {0}")]
    MediaWrite(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::MissingField(_) | DomainError::TooLong { .. } => StatusCode::BAD_REQUEST,
            DomainError::PostNotFound(_) | DomainError::CommentNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::WrongSecret => StatusCode::FORBIDDEN,
            DomainError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            DomainError::MediaWrite(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        let details = match self {
            DomainError::PostNotFound(id) | DomainError::CommentNotFound(id) => {
                Some(json!({ "resource": id }))
            }
            DomainError::TooLong { field, limit } => Some(json!({ "field": field, "limit": limit })),
            DomainError::RateLimited(action) => {
                Some(json!({ "action": action, "message": "slow down and retry later" }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_per_taxonomy() {
        assert_eq!(
            DomainError::MissingField("title").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::PostNotFound(7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(DomainError::WrongSecret.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            DomainError::RateLimited("create_post").status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            DomainError::MediaWrite("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
