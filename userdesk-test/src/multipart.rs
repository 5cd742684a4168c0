/// Builder for a `multipart/form-data` request body.
///
/// ```ignore
/// let body = MultipartBody::new()
///     .text("name", "Ada")
///     .file("file", "me.png", "image/png", png_bytes);
/// app.post("/users").multipart(body).send().await;
/// ```
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("userdesk-{}", uuid::Uuid::new_v4().simple()),
            buf: Vec::new(),
        }
    }

    /// Append a text field.
    pub fn text(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.open_part();
        self.buf.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.buf.extend_from_slice(value.as_ref().as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file field.
    pub fn file(
        mut self,
        name: &str,
        file_name: &str,
        content_type: &str,
        data: impl AsRef<[u8]>,
    ) -> Self {
        self.open_part();
        self.buf.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data.as_ref());
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// The `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Close the body and return the encoded bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buf
    }

    fn open_part(&mut self) {
        self.buf
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}
