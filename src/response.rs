use serde::{Deserialize, Serialize};

/// A completed exchange as seen by the resolver.
///
/// Executors implement this for whatever they receive from the wire; the
/// resolver only needs the success flag and the body text.
pub trait ResponseElement {
    /// Whether the transport considers the exchange successful
    fn is_success(&self) -> bool;

    /// Raw response body
    fn body(&self) -> &str;

    /// HTTP status code, when one was received
    fn status(&self) -> Option<u16> {
        None
    }

    /// Server-side request identifier, when reported
    fn request_id(&self) -> Option<&str> {
        None
    }
}

/// RawResponse is the plain-data response handed back by executors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Whether the exchange succeeded
    pub success: bool,
    /// HTTP status, if the server answered at all
    pub status: Option<u16>,
    /// Response body
    pub body: String,
    /// X-Me header identifying the request on the server
    pub request_id: Option<String>,
}

impl RawResponse {
    /// Create a successful response
    pub fn success(body: impl Into<String>) -> Self {
        RawResponse {
            success: true,
            status: Some(200),
            body: body.into(),
            request_id: None,
        }
    }

    /// Create a failed response
    pub fn failure(status: Option<u16>, body: impl Into<String>) -> Self {
        RawResponse {
            success: false,
            status,
            body: body.into(),
            request_id: None,
        }
    }
}

impl ResponseElement for RawResponse {
    fn is_success(&self) -> bool {
        self.success
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// ListResponse is the page of objects returned by list actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// Objects on this page
    #[serde(default = "Vec::new")]
    pub objects: Vec<T>,

    /// Total number of matching objects across all pages
    #[serde(default)]
    pub total_count: i64,
}

impl<T> ListResponse<T> {
    /// Number of objects on this page
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if this page holds no object
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_deserialization() {
        #[derive(Deserialize)]
        struct Entry {
            id: String,
        }

        let json = r#"{
            "objects": [{"id": "0_a"}, {"id": "0_b"}],
            "totalCount": 12,
            "objectType": "KalturaMediaListResponse"
        }"#;

        let list: ListResponse<Entry> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.total_count, 12);
        assert_eq!(list.objects[1].id, "0_b");
    }

    #[test]
    fn test_list_response_missing_objects() {
        let list: ListResponse<String> = serde_json::from_str(r#"{"totalCount": 0}"#).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_raw_response_accessors() {
        let response = RawResponse::failure(Some(500), "oops");
        assert!(!response.is_success());
        assert_eq!(response.body(), "oops");
        assert_eq!(ResponseElement::status(&response), Some(500));
    }
}
