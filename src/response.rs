//! The JSON envelope shared by every response.
//!
//! Successful and failed responses use the same shape:
//!
//! ```json
//! { "success": true, "message": "...", "data": { ... } }
//! { "success": false, "message": "...", "error": { ... } }
//! ```
//!
//! Absent fields are omitted rather than serialized as `null`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// A failed envelope with a client-facing message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_error(mut self, error: serde_json::Value) -> Self {
        self.error = Some(error);
        self
    }
}

impl ApiResponse<()> {
    /// A successful envelope with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_are_omitted() {
        let value = serde_json::to_value(ApiResponse::<()>::failure("Route not found")).unwrap();
        assert_eq!(value, json!({ "success": false, "message": "Route not found" }));

        let value = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(value, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_builders_compose() {
        let value = serde_json::to_value(
            ApiResponse::success("ok")
                .with_message("done")
                .with_error(json!({ "ignored": false })),
        )
        .unwrap();
        assert_eq!(value["message"], "done");
        assert_eq!(value["data"], "ok");
        assert_eq!(value["error"]["ignored"], false);
    }
}
