//! Inbound form contract and outbound JSON shape for users.

use garde::Validate;
use serde::{Deserialize, Serialize};
use userdesk_core::validation::validate;
use userdesk_core::{FormError, FormFields, FromForm, HttpError, UploadedFile};

use crate::schema::User;

/// Form field carrying the uploaded picture.
pub const FILE_FIELD: &str = "file";
/// Form field carrying a client-supplied picture URL.
pub const PICTURE_FIELD: &str = "profile_picture";

/// The user fields a create or update writes.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct UserFields {
    #[garde(length(min = 1), custom(not_blank))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub phone: Option<String>,
    #[garde(skip)]
    pub address: Option<String>,
    #[garde(skip)]
    pub age: Option<i64>,
}

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}

/// Where the picture for a write comes from.
#[derive(Debug)]
pub enum PictureInput {
    /// Nothing supplied: create stores none, update keeps the current one.
    Keep,
    Upload(UploadedFile),
    /// An absolute `http(s)` URL stored as given.
    Url(String),
}

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Debug)]
pub struct UserForm {
    pub fields: UserFields,
    pub picture: PictureInput,
}

impl UserForm {
    /// Run field validation, yielding a 422 on failure.
    pub fn validate(&self) -> Result<(), HttpError> {
        validate(&self.fields)
    }
}

impl FromForm for UserForm {
    fn from_form(mut form: FormFields) -> Result<Self, FormError> {
        let fields = UserFields {
            name: form.take_text("name")?,
            email: form.take_text("email")?,
            phone: present(form.take_text_opt("phone")),
            address: present(form.take_text_opt("address")),
            age: form.take_parsed_opt("age")?,
        };

        let upload = form.take_file_opt(FILE_FIELD).filter(|file| !file.is_blank());
        let picture = match (upload, present(form.take_text_opt(PICTURE_FIELD))) {
            (Some(file), _) => PictureInput::Upload(file),
            (None, Some(url)) if is_absolute_url(&url) => PictureInput::Url(url),
            (None, Some(_)) => {
                return Err(FormError::Invalid {
                    field: PICTURE_FIELD.to_string(),
                    message: "must be an absolute http(s) URL".to_string(),
                })
            }
            (None, None) => PictureInput::Keep,
        };

        Ok(UserForm { fields, picture })
    }
}

/// Empty form values count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// JSON representation of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub age: Option<i64>,
    pub profile_picture: Option<String>,
}

impl UserOut {
    /// Shape a stored row, resolving its picture against `base_url`.
    pub fn from_user(user: User, base_url: &str) -> Self {
        let profile_picture = picture_url(user.profile_picture.as_deref(), base_url);
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            age: user.age,
            profile_picture,
        }
    }
}

/// `true` for values that parse as an absolute `http` or `https` URL.
pub fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Client-facing URL for a stored picture value.
///
/// Absolute URLs pass through. Relative paths are joined to `base_url` with
/// backslashes turned into forward slashes. Empty or missing values stay
/// missing.
pub fn picture_url(stored: Option<&str>, base_url: &str) -> Option<String> {
    let stored = stored.filter(|s| !s.trim().is_empty())?;
    if is_absolute_url(stored) {
        return Some(stored.to_string());
    }
    let path = stored.replace('\\', "/");
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
