use axum::body::Body;
use axum::Router;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::request::Builder;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

use crate::multipart::MultipartBody;

/// Drives a `Router` in-process, one `oneshot` call per request.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn get(&self, uri: &str) -> TestRequest {
        self.request(Method::GET, uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest {
        self.request(Method::POST, uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest {
        self.request(Method::PUT, uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest {
        self.request(Method::DELETE, uri)
    }

    pub fn request(&self, method: Method, uri: &str) -> TestRequest {
        TestRequest {
            router: self.router.clone(),
            builder: Request::builder().method(method).uri(uri),
            body: Body::empty(),
        }
    }
}

/// A request under construction. Nothing is sent until [`send`](Self::send).
pub struct TestRequest {
    router: Router,
    builder: Builder,
    body: Body,
}

impl TestRequest {
    /// Add a header. Panics on a value that is not a valid header value.
    pub fn header<K>(mut self, name: K, value: &str) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
    {
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid header value {value:?}: {e}"));
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn json(self, payload: &impl Serialize) -> Self {
        let bytes = serde_json::to_vec(payload).expect("payload is not serializable");
        self.with_body("application/json", bytes)
    }

    /// `application/x-www-form-urlencoded` body from key/value pairs.
    pub fn form(self, pairs: &[(&str, &str)]) -> Self {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.with_body("application/x-www-form-urlencoded", encoded)
    }

    pub fn multipart(self, body: MultipartBody) -> Self {
        let content_type = body.content_type();
        self.with_body(&content_type, body.finish())
    }

    /// Raw body, content type left to the caller.
    pub fn body(mut self, bytes: impl Into<Bytes>) -> Self {
        self.body = Body::from(bytes.into());
        self
    }

    fn with_body(mut self, content_type: &str, bytes: impl Into<Bytes>) -> Self {
        self.builder = self.builder.header(CONTENT_TYPE, content_type);
        self.body = Body::from(bytes.into());
        self
    }

    pub async fn send(self) -> TestResponse {
        let request = self.builder.body(self.body).expect("invalid test request");
        let response = self
            .router
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("response body could not be read")
            .to_bytes();

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// Translate a dotted path (`details[0].field`, `[1].name`, `items.len()`)
/// into a JSON pointer plus a flag for a trailing `len()`.
fn to_pointer(path: &str) -> (String, bool) {
    let (path, wants_len) = match path.strip_suffix("len()") {
        Some(rest) => (rest.trim_end_matches('.'), true),
        None => (path, false),
    };

    let mut pointer = String::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let (key, indices) = segment.split_at(segment.find('[').unwrap_or(segment.len()));
        if !key.is_empty() {
            pointer.push('/');
            pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
        }
        for index in indices.split('[').filter(|s| !s.is_empty()) {
            let index = index
                .strip_suffix(']')
                .unwrap_or_else(|| panic!("unclosed index in JSON path {path:?}"));
            pointer.push('/');
            pointer.push_str(index);
        }
    }
    (pointer, wants_len)
}

/// Look `path` up in `root`. Missing keys resolve to `null`.
pub fn lookup(root: &Value, path: &str) -> Value {
    let (pointer, wants_len) = to_pointer(path);
    let found = root.pointer(&pointer).cloned().unwrap_or(Value::Null);
    if !wants_len {
        return found;
    }
    let len = match &found {
        Value::Array(items) => items.len(),
        Value::Object(fields) => fields.len(),
        Value::String(s) => s.chars().count(),
        other => panic!("len() on a non-collection at {path:?}: {other}"),
    };
    Value::from(len)
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        if self.status != expected {
            panic!(
                "expected status {expected}, got {}\nbody: {}",
                self.status,
                self.text()
            );
        }
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_conflict(self) -> Self {
        self.assert_status(StatusCode::CONFLICT)
    }

    pub fn assert_unprocessable(self) -> Self {
        self.assert_status(StatusCode::UNPROCESSABLE_ENTITY)
    }

    /// Compare the value at a dotted JSON path:
    ///
    /// ```ignore
    /// resp.assert_json_path("details[0].field", "email")
    ///     .assert_json_path("details.len()", 1);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let actual = lookup(&root, path);
        let expected = expected.into();
        assert_eq!(actual, expected, "JSON path {path:?} in {root}");
        self
    }

    /// Deserialize the value at a dotted JSON path.
    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root: Value = self.json();
        let value = lookup(&root, path);
        serde_json::from_value(value)
            .unwrap_or_else(|e| panic!("JSON path {path:?} in {root} does not deserialize: {e}"))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not the expected JSON ({e}): {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_paths_become_pointers() {
        assert_eq!(to_pointer("id"), ("/id".to_string(), false));
        assert_eq!(to_pointer("[1].name"), ("/1/name".to_string(), false));
        assert_eq!(
            to_pointer("details[0].field"),
            ("/details/0/field".to_string(), false)
        );
        assert_eq!(to_pointer("len()"), (String::new(), true));
        assert_eq!(to_pointer("checks.len()"), ("/checks".to_string(), true));
    }

    #[test]
    fn lookup_resolves_values_and_lengths() {
        let doc = json!({"users": [{"email": "a@x.com"}, {"email": "b@x.com"}]});
        assert_eq!(lookup(&doc, "users[1].email"), json!("b@x.com"));
        assert_eq!(lookup(&doc, "users.len()"), json!(2));
        assert_eq!(lookup(&doc, "users[5].email"), Value::Null);
        assert_eq!(lookup(&json!([1, 2, 3]), "len()"), json!(3));
    }
}
