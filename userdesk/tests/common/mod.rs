#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use userdesk::settings::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PUBLIC_URL};
use userdesk::AppSettings;
use userdesk_test::TestApp;

/// A fully wired router over a throwaway SQLite file and upload directory.
pub struct Harness {
    pub app: TestApp,
    pub dir: TempDir,
}

impl Harness {
    pub async fn start() -> Self {
        Self::with(|_| {}).await
    }

    pub async fn with(tweak: impl FnOnce(&mut AppSettings)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = AppSettings {
            addr: ([127, 0, 0, 1], 0).into(),
            database_url: format!("sqlite://{}?mode=rwc", dir.path().join("users.db").display()),
            max_connections: 1,
            upload_dir: dir.path().join("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            json_logs: false,
        };
        tweak(&mut settings);

        let router = userdesk::prepare(&settings).await.unwrap();
        Harness {
            app: TestApp::new(router),
            dir,
        }
    }

    pub fn uploads(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    /// Number of files in the upload directory (zero when it was never created).
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Create a user from url-encoded fields and return its id.
    pub async fn create(&self, fields: &[(&str, &str)]) -> i64 {
        self.app
            .post("/users")
            .form(fields)
            .send()
            .await
            .assert_created()
            .json_path("id")
    }

    pub async fn count(&self) -> usize {
        self.app
            .get("/users?limit=1000")
            .send()
            .await
            .assert_ok()
            .json_path("len()")
    }
}
