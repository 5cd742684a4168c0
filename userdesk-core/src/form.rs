//! Form body extraction for `multipart/form-data` and
//! `application/x-www-form-urlencoded` requests.
//!
//! Both encodings are collected into the same [`FormFields`] bag, so a type
//! implementing [`FromForm`] does not care which one the client used.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::error::HttpError;
use crate::validation::ValidationErrorResponse;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Errors that can occur while reading a form body.
#[derive(Debug)]
pub enum FormError {
    /// A required field was not present in the form.
    MissingField(String),
    /// A text field could not be parsed to the expected type.
    Invalid { field: String, message: String },
    /// The request body is not a form.
    UnsupportedContentType(String),
    /// The body could not be decoded as the declared encoding.
    Malformed(String),
    /// The body exceeds the configured size limit.
    TooLarge(String),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(name) => write!(f, "missing required field: {name}"),
            Self::Invalid { field, message } => {
                write!(f, "invalid value for field '{field}': {message}")
            }
            Self::UnsupportedContentType(ct) => write!(
                f,
                "expected multipart/form-data or application/x-www-form-urlencoded, got '{ct}'"
            ),
            Self::Malformed(msg) => write!(f, "malformed form body: {msg}"),
            Self::TooLarge(msg) => write!(f, "form body too large: {msg}"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<FormError> for HttpError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::MissingField(name) => HttpError::Validation(ValidationErrorResponse::single(
                name,
                "field required",
                "missing",
            )),
            FormError::Invalid { field, message } => {
                HttpError::Validation(ValidationErrorResponse::single(field, message, "parse"))
            }
            FormError::TooLarge(msg) => HttpError::PayloadTooLarge(msg),
            other => HttpError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

// ── UploadedFile ─────────────────────────────────────────────────────────────

/// A file received from a multipart form upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// The field name in the form.
    pub name: String,
    /// The original file name provided by the client, if any.
    pub file_name: Option<String>,
    /// The content type (MIME type) of the file, if provided.
    pub content_type: Option<String>,
    /// The raw file data.
    pub data: Bytes,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A part browsers send when the file input was left empty: no file name
    /// and no content.
    pub fn is_blank(&self) -> bool {
        self.file_name.as_deref().map_or(true, str::is_empty) && self.data.is_empty()
    }
}

// ── FormFields ───────────────────────────────────────────────────────────────

/// All fields of a form body, text and files kept apart.
#[derive(Debug, Default)]
pub struct FormFields {
    /// Text fields, keyed by field name. Multiple values per key are supported.
    pub text: HashMap<String, Vec<String>>,
    /// File fields, keyed by field name. Multiple files per key are supported.
    pub files: HashMap<String, Vec<UploadedFile>>,
}

fn multipart_error(err: MultipartError) -> FormError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FormError::TooLarge(err.body_text())
    } else {
        FormError::Malformed(err.body_text())
    }
}

impl FormFields {
    /// Consume an Axum `Multipart` extractor and collect all fields.
    pub async fn collect_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut fields = FormFields::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());

            let data = field.bytes().await.map_err(multipart_error)?;

            // A part with a file name is an upload, everything else is text.
            if file_name.is_some() {
                fields.files.entry(name.clone()).or_default().push(UploadedFile {
                    name,
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let text_value = String::from_utf8(data.to_vec()).map_err(|_| FormError::Invalid {
                    field: name.clone(),
                    message: "value is not valid UTF-8".to_string(),
                })?;
                fields.text.entry(name).or_default().push(text_value);
            }
        }

        Ok(fields)
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut fields = FormFields::default();
        for (key, value) in form_urlencoded::parse(body) {
            fields
                .text
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        fields
    }

    /// Take a single required text value for the given field name.
    pub fn take_text(&mut self, name: &str) -> Result<String, FormError> {
        self.take_text_opt(name)
            .ok_or_else(|| FormError::MissingField(name.to_string()))
    }

    /// Take an optional text value for the given field name.
    pub fn take_text_opt(&mut self, name: &str) -> Option<String> {
        self.text
            .get_mut(name)
            .and_then(|v| if v.is_empty() { None } else { Some(v.remove(0)) })
    }

    /// Take and parse an optional text value. An empty or whitespace-only
    /// value counts as absent.
    pub fn take_parsed_opt<T>(&mut self, name: &str) -> Result<Option<T>, FormError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.take_text_opt(name) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| FormError::Invalid {
                field: name.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Take an optional file for the given field name.
    pub fn take_file_opt(&mut self, name: &str) -> Option<UploadedFile> {
        self.files
            .get_mut(name)
            .and_then(|v| if v.is_empty() { None } else { Some(v.remove(0)) })
    }
}

// ── FromForm trait ───────────────────────────────────────────────────────────

/// Trait for types that can be constructed from form fields.
pub trait FromForm: Sized {
    fn from_form(fields: FormFields) -> Result<Self, FormError>;
}

// ── TypedForm extractor ──────────────────────────────────────────────────────

/// An Axum extractor that reads a multipart or urlencoded form body and
/// builds a `T: FromForm` from it.
///
/// Any other content type is rejected with a 400.
pub struct TypedForm<T>(pub T);

impl<T, S> FromRequest<S> for TypedForm<T>
where
    T: FromForm,
    S: Send + Sync,
{
    type Rejection = FormError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let fields = if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| FormError::Malformed(rejection.body_text()))?;
            FormFields::collect_multipart(multipart).await?
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let body = Bytes::from_request(req, state).await.map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    FormError::TooLarge(rejection.body_text())
                } else {
                    FormError::Malformed(rejection.body_text())
                }
            })?;
            FormFields::from_urlencoded(&body)
        } else {
            return Err(FormError::UnsupportedContentType(content_type));
        };

        T::from_form(fields).map(TypedForm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencoded_body_is_collected_as_text() {
        let mut fields = FormFields::from_urlencoded(b"name=Ada+L&email=ada%40example.com");
        assert_eq!(fields.take_text("name").unwrap(), "Ada L");
        assert_eq!(fields.take_text("email").unwrap(), "ada@example.com");
        assert!(matches!(fields.take_text("name"), Err(FormError::MissingField(_))));
    }

    #[test]
    fn empty_parsed_value_counts_as_absent() {
        let mut fields = FormFields::from_urlencoded(b"age=");
        assert_eq!(fields.take_parsed_opt::<i64>("age").unwrap(), None);
    }

    #[test]
    fn unparsable_value_names_the_field() {
        let mut fields = FormFields::from_urlencoded(b"age=old");
        match fields.take_parsed_opt::<i64>("age") {
            Err(FormError::Invalid { field, .. }) => assert_eq!(field, "age"),
            other => panic!("expected invalid field error, got {other:?}"),
        }
    }

    #[test]
    fn blank_file_part_is_detected() {
        let blank = UploadedFile {
            name: "file".into(),
            file_name: Some(String::new()),
            content_type: Some("application/octet-stream".into()),
            data: Bytes::new(),
        };
        assert!(blank.is_blank());

        let real = UploadedFile {
            file_name: Some("me.png".into()),
            data: Bytes::from_static(b"\x89PNG"),
            ..blank
        };
        assert!(!real.is_blank());
    }
}
