use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::models::User;

/// Shared handle to the signed-in user, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<User>>>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(user))),
        }
    }

    pub async fn username(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|u| u.username.clone())
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|u| u.token.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    pub async fn sign_in(&self, user: User) {
        info!(username = %user.username, "session started");
        *self.inner.write().await = Some(user);
    }

    pub async fn sign_out(&self) {
        if let Some(user) = self.inner.write().await.take() {
            info!(username = %user.username, "session ended");
        }
    }
}
