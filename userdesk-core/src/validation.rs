use serde::Serialize;

use crate::error::HttpError;

/// A field-level validation error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Container for validation errors, used as the payload of `HttpError::Validation`.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

impl ValidationErrorResponse {
    /// A response carrying exactly one field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>, code: &str) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
                code: code.to_string(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run garde validation on `value` and turn a failed report into `HttpError::Validation`.
pub fn validate<T>(value: &T) -> Result<(), HttpError>
where
    T: garde::Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| HttpError::Validation(convert_garde_report(&report)))
}

pub fn convert_garde_report(report: &garde::Report) -> ValidationErrorResponse {
    let errors = report
        .iter()
        .map(|(path, error)| {
            let field = {
                let s = path.to_string();
                if s.is_empty() { "value".to_string() } else { s }
            };
            FieldError {
                field,
                message: error.message().to_string(),
                code: "validation".to_string(),
            }
        })
        .collect();

    ValidationErrorResponse { errors }
}

pub use garde::Validate;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(garde::Validate)]
    struct Signup {
        #[garde(length(min = 1))]
        name: String,
        #[garde(email)]
        email: String,
    }

    #[test]
    fn valid_value_passes() {
        let signup = Signup { name: "Ada".into(), email: "ada@example.com".into() };
        assert!(validate(&signup).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let signup = Signup { name: String::new(), email: "not-an-email".into() };
        let err = validate(&signup).unwrap_err();
        let HttpError::Validation(resp) = err else {
            panic!("expected validation error, got {err}");
        };
        let mut fields: Vec<_> = resp.errors.iter().map(|e| e.field.as_str()).collect();
        fields.sort();
        assert_eq!(fields, ["email", "name"]);
    }
}
