//! Error types for the fetch client.
//!
//! # Design
//! Every failure a caller can see is an `HttpError`: a kind, a message, the
//! HTTP status code that best describes it, and the URL or path involved.
//! Misuse (missing base URL, missing payload), deadline expiry, transport
//! failures and non-2xx responses all collapse into that one shape so callers
//! handle a single error type. `TransportError` is the narrower error a
//! `Transport` implementation reports; the dispatcher translates it.

use thiserror::Error;

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Classification of an `HttpError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller misused the client (relative URL without base, missing body).
    BadRequest,
    /// The deadline elapsed before the transport answered.
    RequestTimeout,
    /// Unclassified transport failure or undecodable response.
    InternalError,
    /// No response object, or a required option was missing.
    NotFound,
    /// The server answered with a non-2xx status.
    HttpStatus,
}

impl ErrorKind {
    /// Stable name for the kind, suitable for logs and wire payloads.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequestError",
            ErrorKind::RequestTimeout => "RequestTimeOut",
            ErrorKind::InternalError => "InternalError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::HttpStatus => "HttpStatusError",
        }
    }

    /// Status code implied by the kind. `HttpStatus` carries the upstream
    /// code instead, so this returns 500 only as a placeholder for it.
    pub fn default_status(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::RequestTimeout => 408,
            ErrorKind::InternalError | ErrorKind::HttpStatus => 500,
            ErrorKind::NotFound => 404,
        }
    }
}

/// Any failure produced by `HttpClient`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} ({status_code}) at {path}: {message}", .kind.name())]
pub struct HttpError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: u16,
    pub path: String,
}

impl HttpError {
    fn with_kind(kind: ErrorKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: kind.default_status(),
            path: path.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::BadRequest, message, path)
    }

    pub fn timeout(path: impl Into<String>) -> Self {
        Self::with_kind(
            ErrorKind::RequestTimeout,
            "failed to process request in time, please try again",
            path,
        )
    }

    pub fn internal(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::InternalError, message, path)
    }

    pub fn not_found(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::NotFound, message, path)
    }

    /// A non-2xx response; the status code mirrors the upstream one.
    pub fn status(status_code: u16, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::HttpStatus,
            message: message.into(),
            status_code,
            path: path.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::RequestTimeout
    }
}

/// Failures reported by a `Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be sent or the exchange broke off.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    pub fn name(&self) -> &'static str {
        match self {
            TransportError::Connect(_) => "ConnectError",
            TransportError::Request(_) => "RequestError",
            TransportError::Body(_) => "BodyError",
        }
    }
}
