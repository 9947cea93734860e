//! API client for communicating with the inventory REST API.
//!
//! `ApiClient` is the production `Transport`: it turns an `ApiRequest` into
//! a reqwest call against the configured base URL. It never retries; a failed
//! request is reported once and the caller decides what to do.

use std::time::Duration;

use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use super::request::{ApiRequest, FormFields, FormValue, RequestBody, Transport, TransportFuture};
use super::ApiError;
use crate::config::Config;

/// API client for the inventory backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the configured base URL
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn build_form(fields: FormFields) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in fields.into_fields() {
            form = match field.value {
                FormValue::Text(text) => form.text(field.name, text),
                FormValue::File(upload) => {
                    let part = Part::bytes(upload.bytes)
                        .file_name(upload.file_name)
                        .mime_str(&upload.content_type)?;
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Execute one request and return its JSON body, if any
    pub async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = self.url(&request.path);
        let method = request.method.clone();

        let builder = self
            .client
            .request(request.method, &url)
            .header(header::ACCEPT, "application/json");

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(fields) => builder.multipart(Self::build_form(fields)?),
        };

        let response = builder.send().await?;
        debug!(method = %method, url = %url, status = %response.status(), "Response received");

        let response = match Self::check_response(response).await {
            Ok(response) => response,
            Err(e) => {
                if method != Method::GET {
                    warn!(method = %method, url = %url, error = %e, "Write rejected");
                }
                return Err(e);
            }
        };

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::MalformedResponse(format!("{}: {}", request.path, e)))
    }
}

impl Transport for ApiClient {
    fn send(&self, request: ApiRequest) -> TransportFuture {
        let client = self.clone();
        async move { client.execute(request).await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageUpload;

    fn client_for(base: &str) -> ApiClient {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config).expect("client builds")
    }

    #[test]
    fn test_url_joining() {
        let client = client_for("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/dealers"), "http://localhost:8000/api/dealers");
        assert_eq!(client.url("api/dealers"), "http://localhost:8000/api/dealers");
    }

    #[test]
    fn test_build_form_accepts_image() {
        let fields = FormFields::new().text("filename", "logo").file(
            "image",
            Some(&ImageUpload::new("logo.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])),
        );
        assert!(ApiClient::build_form(fields).is_ok());
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let fields = FormFields::new().file(
            "image",
            Some(&ImageUpload::new("logo.png", "not a mime", vec![1])),
        );
        assert!(matches!(
            ApiClient::build_form(fields),
            Err(ApiError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let client = client_for("http://127.0.0.1:9");
        let err = client
            .execute(ApiRequest::get("/api/dealers"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(_)));
    }
}
