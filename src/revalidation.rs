use serde::Serialize;
use std::sync::{Arc, Mutex};

/// RevalidationService
///
/// Tells the server-rendering frontend that a cached page is stale. Best effort
/// and at most once per trigger: callers never wait on delivery and a failed
/// signal is only logged.
pub trait RevalidationService: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// RevalidationState
///
/// The concrete type used to share the revalidation service across the application state.
pub type RevalidationState = Arc<dyn RevalidationService>;

#[derive(Serialize)]
struct RevalidateBody<'a> {
    path: &'a str,
}

/// HttpRevalidator
///
/// POSTs `{ "path": ... }` to the frontend's revalidation hook on a spawned task.
#[derive(Clone)]
pub struct HttpRevalidator {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpRevalidator {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            token,
        }
    }
}

impl RevalidationService for HttpRevalidator {
    fn revalidate(&self, path: &str) {
        let client = self.client.clone();
        let url = self.url.clone();
        let token = self.token.clone();
        let path = path.to_string();

        tokio::spawn(async move {
            let mut request = client.post(&url).json(&RevalidateBody { path: &path });
            if let Some(token) = token {
                request = request.header("x-revalidate-token", token);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(%path, "revalidation signal delivered");
                }
                Ok(response) => {
                    tracing::warn!(
                        %path,
                        status = %response.status(),
                        "revalidation hook refused signal"
                    );
                }
                Err(e) => {
                    tracing::warn!(%path, error = %e, "revalidation signal failed");
                }
            }
        });
    }
}

/// NoopRevalidator
///
/// Used when `REVALIDATE_URL` is not configured.
#[derive(Clone, Default)]
pub struct NoopRevalidator;

impl RevalidationService for NoopRevalidator {
    fn revalidate(&self, path: &str) {
        tracing::trace!(%path, "revalidation disabled, dropping signal");
    }
}

/// RecordingRevalidator
///
/// Test double that remembers every path it was asked to revalidate.
#[derive(Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RevalidationService for RecordingRevalidator {
    fn revalidate(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}
