use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;

/// Uniform JSON envelope. Business results always ride HTTP 200; failures are
/// signaled by `status: false` plus an application code, never by HTTP status.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u32,
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

pub const CODE_SUCCESS: u32 = 2000;
pub const CODE_AUTH_FAIL: u32 = 2001;
pub const CODE_VALIDATION: u32 = 5001;
pub const CODE_PERSISTENCE: u32 = 5002;
pub const CODE_CONFLICT: u32 = 5003;
pub const CODE_NOT_FOUND: u32 = 5004;
pub const CODE_COMPUTATION: u32 = 5005;

pub fn ok<T: Serialize>(data: T, msg: &str) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        code: CODE_SUCCESS,
        status: true,
        message: msg.to_string(),
        data: Some(data),
        total: None,
    })
}

pub fn ok_with_total<T: Serialize>(data: T, total: i64, msg: &str) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        code: CODE_SUCCESS,
        status: true,
        message: msg.to_string(),
        data: Some(data),
        total: Some(total),
    })
}

pub fn ok_empty(msg: &str) -> HttpResponse {
    ok(serde_json::Value::Null, msg)
}

/// Business error kinds. Every handler converts failures into one of these;
/// the envelope code is derived from the kind.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "invalid input: {}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "computation failed: {}", _0)]
    Computation(String),
    #[display(fmt = "storage failure: {}", _0)]
    Persistence(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
}

impl AppError {
    pub fn code(&self) -> u32 {
        match self {
            AppError::Validation(_) => CODE_VALIDATION,
            AppError::NotFound(_) => CODE_NOT_FOUND,
            AppError::Conflict(_) => CODE_CONFLICT,
            AppError::Computation(_) => CODE_COMPUTATION,
            AppError::Persistence(_) => CODE_PERSISTENCE,
            AppError::Unauthorized(_) => CODE_AUTH_FAIL,
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    // Business failures are still HTTP 200; the envelope carries the code.
    fn status_code(&self) -> StatusCode {
        StatusCode::OK
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Ok().json(Envelope::<serde_json::Value> {
            code: self.code(),
            status: false,
            message: self.to_string(),
            data: None,
            total: None,
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".to_string()),
            other => AppError::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_by_kind() {
        assert_eq!(AppError::Validation("x".into()).code(), CODE_VALIDATION);
        assert_eq!(AppError::NotFound("x".into()).code(), CODE_NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).code(), CODE_CONFLICT);
        assert_eq!(AppError::Computation("x".into()).code(), CODE_COMPUTATION);
        assert_eq!(AppError::Persistence("x".into()).code(), CODE_PERSISTENCE);
        assert_eq!(AppError::Unauthorized("x".into()).code(), CODE_AUTH_FAIL);
    }

    #[test]
    fn failure_envelope_is_http_200() {
        let err = AppError::NotFound("no such record".into());
        assert_eq!(err.status_code(), StatusCode::OK);
    }

    #[test]
    fn envelope_serializes_total_only_when_present() {
        let with = serde_json::to_string(&Envelope {
            code: CODE_SUCCESS,
            status: true,
            message: String::new(),
            data: Some(1),
            total: Some(3),
        })
        .unwrap();
        assert!(with.contains("\"total\":3"));

        let without = serde_json::to_string(&Envelope {
            code: CODE_SUCCESS,
            status: true,
            message: String::new(),
            data: Some(1),
            total: None,
        })
        .unwrap();
        assert!(!without.contains("total"));
    }
}
