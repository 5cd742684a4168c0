//! # userdesk
//!
//! User records over HTTP, with optional profile-picture uploads stored on
//! local disk.
//!
//! | Route | |
//! |-------|-|
//! | `POST /users` | create from a form, `201` |
//! | `GET /users?skip=&limit=` | list in id order |
//! | `GET /users/{id}` | fetch one |
//! | `PUT /users/{id}` | replace fields, optionally the picture |
//! | `DELETE /users/{id}` | remove |
//! | `GET /uploads/{file}` | stored pictures |
//! | `GET /health` | database probe |

pub mod app;
pub mod contracts;
pub mod handlers;
pub mod repository;
pub mod schema;
pub mod settings;
pub mod state;
pub mod storage;

pub use app::{build_router, prepare, run};
pub use contracts::{UserForm, UserOut};
pub use schema::User;
pub use settings::AppSettings;
pub use state::AppState;
pub use storage::UploadStore;
