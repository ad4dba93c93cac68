//! Caller-supplied request configuration for guarded requests.
//!
//! Everything here is owned and `Clone` so a request rejected with 401 can be
//! sent again unchanged after the token refresh.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::error::GuardError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Method, headers and body of a guarded request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

/// Request body.
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    /// multipart/form-data; the boundary content type is set by the client
    Multipart(Vec<FormField>),
}

/// A single multipart form field.
#[derive(Debug, Clone)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(Body::Json(value));
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.body = Some(Body::Text(value.into()));
        self
    }

    pub fn bytes(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Bytes(value.into()));
        self
    }

    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = Some(Body::Multipart(fields));
        self
    }

    fn is_form(&self) -> bool {
        matches!(self.body, Some(Body::Multipart(_)))
    }

    /// Caller headers plus the bearer token, defaulting the content type to
    /// JSON unless one was given or the body is a multipart form.
    pub(crate) fn headers_with_token(&self, access: &str) -> Result<HeaderMap, GuardError> {
        let mut headers = self.headers.clone();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access))?,
        );
        if !headers.contains_key(CONTENT_TYPE) && !self.is_form() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        Ok(headers)
    }

    /// Attach the body to an outgoing request.
    pub(crate) fn apply_body(&self, builder: RequestBuilder) -> Result<RequestBuilder, GuardError> {
        let builder = match &self.body {
            None => builder,
            Some(Body::Json(value)) => builder.body(serde_json::to_vec(value)?),
            Some(Body::Text(text)) => builder.body(text.clone()),
            Some(Body::Bytes(bytes)) => builder.body(bytes.clone()),
            Some(Body::Multipart(fields)) => builder.multipart(build_form(fields)?),
        };
        Ok(builder)
    }
}

fn build_form(fields: &[FormField]) -> Result<Form, GuardError> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    part = part.mime_str(mime)?;
                }
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}
