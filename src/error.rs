use std::path::PathBuf;

use actix_web::error::{BlockingError, InternalError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::page;

/// Failures while loading the model artifacts. Always fatal at startup.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load ONNX model {path}: {message}")]
    Onnx { path: PathBuf, message: String },

    #[error("unsupported artifact format for {path} (expected .json or .onnx)")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid token pattern `{pattern}`: {source}")]
    TokenPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid artifact {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Failures during a single transform/predict call.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("feature vector has {actual} columns, classifier expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("classifier produced unknown class {0}")]
    UnknownClass(i64),

    #[error("model execution failed: {0}")]
    Runtime(String),
}

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    #[error("prediction failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("inference worker failed: {0}")]
    Worker(#[from] BlockingError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) | AppError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            AppError::MissingField(_) => self.to_string(),
            AppError::Inference(_) | AppError::Worker(_) => {
                tracing::error!(error = %self, "request failed");
                "The message could not be classified.".to_string()
            }
        };

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(page::render_error(status, &message))
    }
}

/// Renders form extraction failures (wrong content type, oversized body)
/// as the HTML error page instead of actix's plain-text body.
pub fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    let status = err.status_code();
    let message = match &err {
        UrlencodedError::Overflow { .. } => "The message is too large.",
        UrlencodedError::ContentType => "Submit the message with the form.",
        _ => "The form could not be read.",
    };
    tracing::debug!(error = %err, "rejected form body");

    let response = HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(page::render_error(status, message));
    InternalError::from_response(err, response).into()
}
