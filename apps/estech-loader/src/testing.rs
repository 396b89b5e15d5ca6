//! In-memory fakes for the injected capabilities

use crate::config::remote::{HttpResponse, HttpTransport};
use crate::error::{LoaderError, Result};
use crate::platform::traits::{AppLauncher, AppLookup};
use async_trait::async_trait;
use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A small configuration document with a Chrome and a Safari action
pub fn config_json(version: i64) -> String {
    format!(
        r#"{{"version": {version}, "items": [
            {{"title": "Google Chrome", "command": "chrome",
              "bundleIds": ["com.google.Chrome"], "paths": ["/Applications/Google Chrome.app"]}},
            {{"title": "Safari", "command": "safari", "bundleIds": ["com.apple.Safari"]}}
        ]}}"#
    )
}

/// Transport that replays one canned answer and records requested URLs
#[derive(Default)]
pub struct FakeTransport {
    answer: Option<std::result::Result<HttpResponse, String>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn with_response(status: u16, body: &[u8]) -> Self {
        Self {
            answer: Some(Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failure(detail: &str) -> Self {
        Self {
            answer: Some(Err(detail.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &Url) -> std::result::Result<HttpResponse, String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.answer
            .clone()
            .unwrap_or_else(|| Err("no response configured".to_string()))
    }
}

/// Lookup backed by fixed tables; records every query in order
#[derive(Default)]
pub struct FakeLookup {
    identifiers: HashMap<String, PathBuf>,
    paths: HashSet<PathBuf>,
    queries: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn with_identifier(mut self, id: &str, location: &str) -> Self {
        self.identifiers.insert(id.to_string(), PathBuf::from(location));
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.paths.insert(PathBuf::from(path));
        self
    }

    /// Queries in call order, as `id:<x>` or `path:<x>`
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl AppLookup for FakeLookup {
    fn resolve_identifier(&self, id: &str) -> Option<PathBuf> {
        self.queries.lock().unwrap().push(format!("id:{id}"));
        self.identifiers.get(id).cloned()
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.queries
            .lock()
            .unwrap()
            .push(format!("path:{}", path.display()));
        self.paths.contains(path)
    }
}

/// Launcher that records locations and optionally refuses to launch
#[derive(Default)]
pub struct RecordingLauncher {
    fail: bool,
    launched: Mutex<Vec<PathBuf>>,
}

impl RecordingLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> Vec<PathBuf> {
        self.launched.lock().unwrap().clone()
    }
}

impl AppLauncher for RecordingLauncher {
    fn launch(&self, location: &Path) -> Result<()> {
        self.launched.lock().unwrap().push(location.to_path_buf());
        if self.fail {
            return Err(LoaderError::launch_failed(location, "refused by test launcher"));
        }
        Ok(())
    }
}
