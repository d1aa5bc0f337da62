//! The dispatch routine shared by every verb.
//!
//! One call: reject a bodiless non-GET request, arm a deadline, race the
//! transport against it, then turn whatever came back into either the
//! decoded JSON body or an `HttpError`.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::deadline::{Deadline, Elapsed};
use crate::error::{HttpError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Issue `request` through `transport`, failing with `RequestTimeout` if no
/// answer arrives within `timeout`.
pub async fn dispatch(
    transport: &dyn Transport,
    request: HttpRequest,
    timeout: Duration,
) -> Result<Value> {
    let method = request.method;
    let url = request.url.clone();

    let has_body = request.body.as_deref().is_some_and(|b| !b.is_empty());
    if method != HttpMethod::Get && !has_body {
        return Err(HttpError::bad_request(
            format!("payload is required to {method}"),
            url,
        ));
    }

    debug!(%method, %url, ?timeout, "dispatching request");
    let outcome = {
        let deadline = Deadline::arm(timeout);
        deadline.race(transport.send(request)).await
    };

    let response = match outcome {
        Err(Elapsed) => {
            warn!(%method, %url, ?timeout, "request timed out");
            return Err(HttpError::timeout(url));
        }
        Ok(Err(err)) => {
            warn!(%method, %url, error = %err, "transport failure");
            return Err(HttpError::internal(format!("{}: {err}", err.name()), url));
        }
        Ok(Ok(None)) => {
            return Err(HttpError::not_found("no response was sent by the server", url));
        }
        Ok(Ok(Some(response))) => response,
    };

    into_json(response)
}

fn into_json(response: HttpResponse) -> Result<Value> {
    let decoded = decode_body(&response.body);

    if !response.is_success() {
        let message = decoded
            .ok()
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("request failed with status {}", response.status));
        debug!(status = response.status, url = %response.url, %message, "non-success response");
        return Err(HttpError::status(response.status, message, response.url));
    }

    decoded.map_err(|e| {
        HttpError::internal(format!("invalid JSON in response body: {e}"), response.url)
    })
}

/// An empty body decodes to `null` so 204-style answers still succeed.
fn decode_body(body: &str) -> std::result::Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
}
