#![allow(dead_code)]

use chrono::Utc;
use restaurant_portal::{
    AppState, InMemoryRepository, RecordingRevalidator,
    config::AppConfig,
    models::{Role, User},
    repository::RepositoryState,
    revalidation::RevalidationState,
};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory application state plus handles to inspect what the handlers did.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub revalidator: Arc<RecordingRevalidator>,
}

impl TestContext {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let revalidator = Arc::new(RecordingRevalidator::new());
        let state = AppState::new(
            repo.clone() as RepositoryState,
            revalidator.clone() as RevalidationState,
            AppConfig::default(),
        );
        Self {
            state,
            repo,
            revalidator,
        }
    }

    pub fn seed_user(&self, role: Role) -> User {
        let id = Uuid::new_v4();
        let user = User {
            id,
            name: format!("{} user", role.as_str()),
            email: format!("{}@example.com", id),
            role,
            created_at: Utc::now(),
        };
        self.repo.seed_user(user.clone());
        user
    }

    /// `Cookie` header value carrying a freshly issued session for `user`.
    pub fn session_cookie(&self, user: &User) -> String {
        let token = self
            .state
            .sessions
            .issue(user)
            .expect("failed to sign test session");
        format!("auth-token={}", token)
    }
}

pub fn contact_payload(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": "guest@example.com",
        "subject": "Private dining",
        "message": "Do you host parties of 30?"
    })
}
