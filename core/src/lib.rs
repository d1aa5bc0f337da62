//! Small JSON-over-HTTP client with base URL resolution and per-call deadlines.
//!
//! # Overview
//! `HttpClient` resolves request paths against a configured base URL, sends
//! one request through a `Transport`, races it against a timeout, and hands
//! back either the decoded JSON body or a single `HttpError` shape covering
//! misuse, timeouts, transport failures and non-2xx responses.
//!
//! # Design
//! - `ClientConfig` is an immutable value owned by the client; there is no
//!   global default instance.
//! - `HttpRequest` / `HttpResponse` are plain data, so the dispatch logic is
//!   tested against an in-memory transport and `ReqwestTransport` is only a
//!   thin adapter.
//! - Each call arms its own `Deadline`; the guard aborts the timer on every
//!   exit path.
//! - No retries, no pooling policy, no interceptors: a failed call is
//!   returned to the caller as-is.

pub mod client;
pub mod config;
pub mod deadline;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod transport;
pub mod url;

#[cfg(test)]
mod testing;

pub use client::{HttpClient, Reply, RequestOptions};
pub use config::{ClientConfig, ConfigError};
pub use deadline::Deadline;
pub use dispatch::dispatch;
pub use error::{ErrorKind, HttpError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use url::resolve;
