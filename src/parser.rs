use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{RestError, Result};

/// Wire shape of a server exception
#[derive(Debug, Deserialize)]
struct ApiException {
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    args: Option<Value>,
}

/// Parse a success body into `T`.
///
/// An empty body reads as `null`. A body carrying a server exception
/// resolves to [`RestError::Api`]; anything that cannot be mapped to `T`
/// becomes [`RestError::Parse`].
pub fn parse_object<T: DeserializeOwned>(body: &str) -> Result<T> {
    let trimmed = body.trim();
    let value: Value = if trimmed.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(trimmed).map_err(|source| RestError::Parse {
            body: body.to_string(),
            source,
        })?
    };

    if is_exception(&value) {
        return Err(exception_from_value(value));
    }

    serde_json::from_value(value).map_err(|source| RestError::Parse {
        body: body.to_string(),
        source,
    })
}

/// Parse a failure body into a structured error.
///
/// Never fails: bodies that are not a server exception come back as
/// [`RestError::Http`] carrying the raw text.
pub fn parse_error(status: Option<u16>, body: &str) -> RestError {
    match serde_json::from_str::<ApiException>(body) {
        Ok(exception) => RestError::Api {
            code: exception.code,
            message: exception.message,
            args: exception.args,
        },
        Err(_) => RestError::Http {
            status,
            body: body.to_string(),
        },
    }
}

fn is_exception(value: &Value) -> bool {
    value
        .get("objectType")
        .and_then(Value::as_str)
        .is_some_and(|object_type| object_type.ends_with("APIException"))
}

fn exception_from_value(value: Value) -> RestError {
    let body = value.to_string();
    match serde_json::from_value::<ApiException>(value) {
        Ok(exception) => RestError::Api {
            code: exception.code,
            message: exception.message,
            args: exception.args,
        },
        Err(_) => RestError::Http { status: None, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        id: String,
        name: String,
    }

    #[test]
    fn test_parse_object() {
        let entry: Entry = parse_object(r#"{"id":"123","name":"clip"}"#).unwrap();
        assert_eq!(entry, Entry { id: "123".to_string(), name: "clip".to_string() });
    }

    #[test]
    fn test_parse_object_malformed() {
        let result: Result<Entry> = parse_object("not json");
        assert!(matches!(result, Err(RestError::Parse { .. })));

        let result: Result<Entry> = parse_object(r#"{"id":5}"#);
        assert!(matches!(result, Err(RestError::Parse { .. })));
    }

    #[test]
    fn test_parse_object_empty_body() {
        assert!(parse_object::<()>("").is_ok());
        let flag: Option<bool> = parse_object("  ").unwrap();
        assert_eq!(flag, None);
    }

    #[test]
    fn test_parse_object_embedded_exception() {
        let body = r#"{"code":"ENTRY_ID_NOT_FOUND","message":"Entry id \"0_x\" not found","objectType":"KalturaAPIException","args":{"ENTRY_ID":"0_x"}}"#;
        let error = parse_object::<Entry>(body).unwrap_err();
        assert_eq!(error.code(), Some("ENTRY_ID_NOT_FOUND"));
        assert_eq!(error.message(), "Entry id \"0_x\" not found");
    }

    #[test]
    fn test_parse_error() {
        let error = parse_error(Some(500), r#"{"code":"ERR","message":"bad id"}"#);
        assert_eq!(error.code(), Some("ERR"));
        assert_eq!(error.message(), "bad id");

        let error = parse_error(Some(502), "<html>Bad Gateway</html>");
        assert_eq!(error.status_code(), Some(502));
        assert!(!error.is_api_error());
    }
}
