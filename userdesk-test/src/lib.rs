pub mod app;
pub mod multipart;

pub use app::{TestApp, TestRequest, TestResponse};
pub use multipart::MultipartBody;
