//! HTTP plumbing shared by the userdesk service: JSON error responses,
//! layered configuration, form extraction, garde validation, health checks
//! and the standard tower layers.

pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod health;
pub mod layers;
pub mod validation;

pub use config::{Config, ConfigError, ConfigValue, FromConfigValue, Settings};
pub use error::{error_response, HttpError};
pub use extract::{Path, Query};
pub use form::{FormError, FormFields, FromForm, TypedForm, UploadedFile};
pub use health::{HealthIndicator, HealthResponse, HealthStatus};
pub use layers::{catch_panic_layer, default_cors, default_trace, init_tracing, normalize_path};
pub use validation::{FieldError, ValidationErrorResponse};
