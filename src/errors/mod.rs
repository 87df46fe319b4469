use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

use crate::models::StoreError;

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String, error: Option<String> },
    NotFound { message: String, error: Option<String> },
    Store { message: String, error: Option<String> },
    Serialization { message: String, error: Option<String> },
}

#[derive(Serialize)]
struct ErrorInfo<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: ErrorInfo<'a>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest { message: message.into(), error: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound { message: message.into(), error: None }
    }

    pub fn store(message: impl Into<String>, err: impl fmt::Display) -> Self {
        AppError::Store { message: message.into(), error: Some(err.to_string()) }
    }

    pub fn serialization(message: impl Into<String>, err: impl fmt::Display) -> Self {
        AppError::Serialization { message: message.into(), error: Some(err.to_string()) }
    }

    /// Attaches the raw error string reported back to the client.
    pub fn with_error(mut self, err: impl fmt::Display) -> Self {
        let slot = match &mut self {
            AppError::BadRequest { error, .. }
            | AppError::NotFound { error, .. }
            | AppError::Store { error, .. }
            | AppError::Serialization { error, .. } => error,
        };
        *slot = Some(err.to_string());
        self
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Store { message, .. }
            | AppError::Serialization { message, .. } => message,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AppError::BadRequest { error, .. }
            | AppError::NotFound { error, .. }
            | AppError::Store { error, .. }
            | AppError::Serialization { error, .. } => error.as_deref(),
        }
    }

    /// Maps a persistence failure into the error class the client sees.
    /// A statement that touched no row means the record vanished underneath us.
    pub fn from_store(type_name: &str, message: impl Into<String>, err: StoreError) -> Self {
        match err {
            StoreError::NotFound | StoreError::NoRowsAffected => {
                AppError::not_found(format!("{} does not exist", type_name))
            }
            other => AppError::store(message, other),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            AppError::BadRequest { .. } => "Bad Request",
            AppError::NotFound { .. } => "Not Found",
            AppError::Store { .. } => "Store Error",
            AppError::Serialization { .. } => "Serialization Error",
        };
        match self.error() {
            Some(err) => write!(f, "{}: {}: {}", kind, self.message(), err),
            None => write!(f, "{}: {}", kind, self.message()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Store { .. } | AppError::Serialization { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: ErrorInfo {
                message: self.message(),
                error: self.error(),
            },
        })
    }
}

/// Failures that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    Config(String),
    Database(sqlx::Error),
    Schema(String),
    Metrics(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            StartupError::Database(err) => write!(f, "cannot connect to database: {}", err),
            StartupError::Schema(msg) => write!(f, "cannot apply database schema: {}", msg),
            StartupError::Metrics(msg) => write!(f, "cannot set up metrics: {}", msg),
        }
    }
}

impl std::error::Error for StartupError {}
