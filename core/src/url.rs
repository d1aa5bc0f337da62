//! Resolution of request paths against the configured base URL.

use crate::error::{HttpError, Result};

/// Resolve `path` to an absolute URL.
///
/// Absolute `http://` / `https://` paths pass through untouched. Relative
/// paths are joined to `base` with exactly one `/` between them; without a
/// base they are rejected with `BadRequest` before anything touches the
/// network.
pub fn resolve(base: Option<&str>, path: &str) -> Result<String> {
    if is_absolute(path) {
        return Ok(path.to_string());
    }
    let Some(base) = base else {
        return Err(HttpError::bad_request(
            "base url is required for a relative path",
            path,
        ));
    };
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    Ok(format!("{base}/{path}"))
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
