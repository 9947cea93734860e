//! Transport-neutral request description.
//!
//! Writes and reads are described as plain `ApiRequest` values and handed
//! to a `Transport`. The production transport is `ApiClient` (reqwest); tests
//! substitute an in-memory API.

use futures::future::BoxFuture;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;
use crate::models::ImageUpload;

/// One field of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(ImageUpload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub value: FormValue,
}

/// Builder for multipart bodies. Empty text values are skipped, the same way
/// the dashboard forms never send blank fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields(Vec<FormField>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.0.push(FormField {
                name,
                value: FormValue::Text(value),
            });
        }
        self
    }

    pub fn optional_text(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn file(mut self, name: &'static str, upload: Option<&ImageUpload>) -> Self {
        if let Some(upload) = upload {
            self.0.push(FormField {
                name,
                value: FormValue::File(upload.clone()),
            });
        }
        self
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.0.iter().find_map(|field| match &field.value {
            FormValue::Text(text) if field.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn fields(&self) -> &[FormField] {
        &self.0
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FormFields),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/api/dealers/acme`
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_json<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::json(Method::POST, path, body)
    }

    pub fn put_json<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::json(Method::PUT, path, body)
    }

    pub fn post_form(path: impl Into<String>, form: FormFields) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Multipart(form),
        }
    }

    pub fn put_form(path: impl Into<String>, form: FormFields) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: RequestBody::Multipart(form),
        }
    }

    fn json<B: Serialize>(
        method: Method,
        path: impl Into<String>,
        body: &B,
    ) -> Result<Self, ApiError> {
        let path = path.into();
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::Encode(format!("{}: {}", path, e))
        })?;
        Ok(Self {
            method,
            path,
            body: RequestBody::Json(value),
        })
    }
}

/// Future returned by a transport. `None` means an empty body (e.g. 204).
pub type TransportFuture = BoxFuture<'static, Result<Option<Value>, ApiError>>;

/// Anything that can execute an `ApiRequest`.
///
/// `send` only builds the future; it must not block or call back into the
/// query cache.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: ApiRequest) -> TransportFuture;
}
