use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Durable "who follows whom" and "who liked what" overlay, keyed the way the
/// browser's local storage keyed it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RelationshipData {
    // username -> followed by the current profile
    #[serde(rename = "followingData", default)]
    pub following: HashMap<String, bool>,
    // slug -> usernames that liked it
    #[serde(rename = "likedArticles", default)]
    pub liked: HashMap<String, Vec<String>>,
    #[serde(
        rename = "redirectAfterLogin",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_after_login: Option<String>,
}

/// Cloneable handle over the relationship overlay. Every clone shares the same data;
/// concurrent writers are last-write-wins per key.
#[derive(Debug, Clone)]
pub struct RelationshipStore {
    inner: Arc<RwLock<RelationshipData>>,
    path: Option<PathBuf>,
    // One persist at a time: they share the tmp file and must land in order.
    persist_lock: Arc<Mutex<()>>,
}

impl RelationshipStore {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RelationshipData::default())),
            path: None,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Loads the store from `path`. A corrupted file falls back to its `.json.tmp`
    /// sibling, then to an empty store.
    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<RelationshipData>(&bytes) {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        error = %e,
                        path = %path.display(),
                        "malformed relationship store, trying tmp fallback"
                    );
                    read_tmp_fallback(&path.with_extension("json.tmp")).await
                }
            },
            Err(_) => RelationshipData::default(),
        };
        Self {
            inner: Arc::new(RwLock::new(data)),
            path: Some(path),
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn following(&self, username: &str) -> Option<bool> {
        self.inner.read().await.following.get(username).copied()
    }

    pub async fn following_snapshot(&self) -> HashMap<String, bool> {
        self.inner.read().await.following.clone()
    }

    pub async fn set_following(&self, username: &str, following: bool) {
        let mut inner = self.inner.write().await;
        inner.following.insert(username.to_owned(), following);
        drop(inner);
        self.persist().await;
    }

    /// Bulk-applies follow flags; incoming values overwrite existing ones.
    pub async fn merge_following(&self, entries: HashMap<String, bool>) {
        if entries.is_empty() {
            return;
        }
        let mut inner = self.inner.write().await;
        inner.following.extend(entries);
        drop(inner);
        self.persist().await;
    }

    pub async fn liked_by(&self, slug: &str) -> Vec<String> {
        self.inner
            .read()
            .await
            .liked
            .get(slug)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set_liked_by(&self, slug: &str, mut usernames: Vec<String>) {
        let mut seen = std::collections::HashSet::new();
        usernames.retain(|u| seen.insert(u.clone()));
        let mut inner = self.inner.write().await;
        inner.liked.insert(slug.to_owned(), usernames);
        drop(inner);
        self.persist().await;
    }

    pub async fn set_redirect_after_login(&self, path: &str) {
        let mut inner = self.inner.write().await;
        inner.redirect_after_login = Some(path.to_owned());
        drop(inner);
        self.persist().await;
    }

    pub async fn redirect_after_login(&self) -> Option<String> {
        self.inner.read().await.redirect_after_login.clone()
    }

    /// Returns and forgets the stored post-login path.
    pub async fn take_redirect_after_login(&self) -> Option<String> {
        let mut inner = self.inner.write().await;
        let taken = inner.redirect_after_login.take();
        drop(inner);
        if taken.is_some() {
            self.persist().await;
        }
        taken
    }

    pub async fn snapshot(&self) -> RelationshipData {
        self.inner.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.inner.write().await = RelationshipData::default();
        self.persist().await;
    }

    async fn persist(&self) {
        let Some(path) = &self.path else {
            debug!("relationship store is in-memory only; skipping persist");
            return;
        };
        let _guard = self.persist_lock.lock().await;
        // Snapshot under the guard so the last rename carries the newest data.
        let serialized = {
            let inner = self.inner.read().await;
            serde_json::to_vec_pretty(&*inner)
        };
        let bytes = match serialized {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to serialize relationship store");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            warn!(error = %e, path = %tmp.display(), "failed to write temp relationship store");
            return;
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            warn!(error = %e, path = %path.display(), "failed to persist relationship store");
        }
    }
}

async fn read_tmp_fallback(tmp: &Path) -> RelationshipData {
    let bytes = match tokio::fs::read(tmp).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, path = %tmp.display(), "no tmp relationship store; starting empty");
            return RelationshipData::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(data) => data,
        Err(e) => {
            warn!(
                error = %e,
                path = %tmp.display(),
                "tmp relationship store is malformed too; starting empty"
            );
            RelationshipData::default()
        }
    }
}
