//! REST API module for the inventory backend.
//!
//! This module provides the `ApiClient` transport (reqwest), the
//! transport-neutral `ApiRequest` description, resource paths, and the
//! `ApiError` taxonomy shared by reads and writes.
//!
//! Response bodies are decoded into explicit schemas at this boundary; a body
//! of the wrong shape surfaces as `ApiError::MalformedResponse`.

pub mod client;
pub mod error;
pub mod paths;
pub mod request;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::ApiClient;
pub use error::ApiError;
pub use paths::Resource;
pub use request::{ApiRequest, FormFields, FormValue, RequestBody, Transport, TransportFuture};

/// Decode a response body into `T`, naming the path on failure
pub fn decode<T: DeserializeOwned>(path: &str, body: Option<Value>) -> Result<T, ApiError> {
    let body = body.unwrap_or(Value::Null);
    serde_json::from_value(body)
        .map_err(|e| ApiError::MalformedResponse(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_decode_ok() {
        let named: Named = decode("/x", Some(serde_json::json!({"name": "a"}))).unwrap();
        assert_eq!(named.name, "a");
    }

    #[test]
    fn test_decode_wrong_shape_is_malformed() {
        let err = decode::<Named>("/api/x", Some(serde_json::json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(ref m) if m.starts_with("/api/x")));

        let err = decode::<Named>("/api/x", None).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }
}
