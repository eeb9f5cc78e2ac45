use serde::de::DeserializeOwned;

use crate::error::{RestError, Result};
use crate::parser::{parse_error, parse_object};
use crate::response::ResponseElement;

/// Turn a raw response into the declared result type or a structured error.
///
/// Failed responses go through the error parser; success bodies that cannot
/// be mapped to `T` come back as [`RestError::Parse`]. Exactly one of the
/// two outcomes is produced, and no parse failure escapes as a panic.
pub fn resolve<T: DeserializeOwned>(response: &dyn ResponseElement) -> Result<T> {
    let request_id = response.request_id().unwrap_or("-");

    if !response.is_success() {
        let error = parse_error(response.status(), response.body());
        tracing::debug!(request_id, status = ?response.status(), error = %error, "request failed");
        return Err(error);
    }

    parse_object(response.body()).inspect_err(|error| match error {
        RestError::Parse { source, .. } => {
            tracing::warn!(request_id, error = %source, "malformed response body")
        }
        other => tracing::debug!(request_id, error = %other, "server returned an exception"),
    })
}
