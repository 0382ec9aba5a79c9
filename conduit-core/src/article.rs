use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ArticleService;
use crate::error::ClientError;
use crate::host::{Route, ViewHost};
use crate::models::Article;
use crate::session::SessionContext;
use crate::store::RelationshipStore;

pub const ARTICLE_LOAD_FAILED: &str = "Failed to load article";
pub const FOLLOWED: &str = "Followed successfully";
pub const UNFOLLOWED: &str = "Unfollowed successfully";
pub const FOLLOW_FAILED: &str = "Error while following user";
pub const UNFOLLOW_FAILED: &str = "Error while unfollowing user";
pub const ARTICLE_DELETED: &str = "Article deleted";
pub const NOT_YOUR_ARTICLE: &str = "You can only delete your own article";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this article?";

/// Lifecycle of a single-article view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArticleView {
    #[default]
    Idle,
    Loading,
    Ready(Article),
    Failed(String),
    Deleted,
}

impl ArticleView {
    pub fn article(&self) -> Option<&Article> {
        match self {
            ArticleView::Ready(article) => Some(article),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
}

#[derive(Clone)]
pub struct ArticleController {
    service: Arc<dyn ArticleService>,
    store: RelationshipStore,
    session: SessionContext,
    host: Arc<dyn ViewHost>,
    view: Arc<RwLock<ArticleView>>,
    generation: Arc<AtomicU64>,
}

impl ArticleController {
    pub fn new(
        service: Arc<dyn ArticleService>,
        store: RelationshipStore,
        session: SessionContext,
        host: Arc<dyn ViewHost>,
    ) -> Self {
        Self {
            service,
            store,
            session,
            host,
            view: Arc::new(RwLock::new(ArticleView::Idle)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn view(&self) -> ArticleView {
        self.view.read().await.clone()
    }

    pub async fn article(&self) -> Option<Article> {
        self.view.read().await.article().cloned()
    }

    /// Loads `slug`, restarting the view's lifecycle. A load superseded by a
    /// later one leaves the state to the later one.
    pub async fn load(&self, slug: &str) -> Result<(), ClientError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.view.write().await = ArticleView::Loading;

        let result = self.service.fetch_article(slug).await;

        let mut view = self.view.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(%slug, "discarding superseded article load");
            return Ok(());
        }
        match result {
            Ok(article) => {
                *view = ArticleView::Ready(article);
                Ok(())
            }
            Err(err) => {
                warn!(%slug, error = %err, "failed to load article");
                *view = ArticleView::Failed(ARTICLE_LOAD_FAILED.to_owned());
                Err(err)
            }
        }
    }

    /// Whether the session user follows `username`, per the relationship store
    /// or the loaded article's author flag.
    pub async fn is_following(&self, username: &str) -> bool {
        if self.store.following(username).await.unwrap_or(false) {
            return true;
        }
        self.view
            .read()
            .await
            .article()
            .map(|a| a.is_written_by(username) && a.author.following)
            .unwrap_or(false)
    }

    /// Follows or unfollows `username`. Nothing changes locally until the server
    /// confirms.
    pub async fn toggle_follow(&self, username: &str) -> Result<bool, ClientError> {
        let was_following = self.is_following(username).await;
        let result = if was_following {
            self.service.unfollow(username).await
        } else {
            self.service.follow(username).await
        };

        match result {
            Ok(profile) => {
                self.store.set_following(username, profile.following).await;
                if let ArticleView::Ready(article) = &mut *self.view.write().await {
                    if article.is_written_by(username) {
                        article.author.following = profile.following;
                    }
                }
                self.host
                    .notify(if was_following { UNFOLLOWED } else { FOLLOWED });
                Ok(profile.following)
            }
            Err(err) => {
                warn!(%username, error = %err, "follow toggle rejected");
                self.host.notify(if was_following {
                    UNFOLLOW_FAILED
                } else {
                    FOLLOW_FAILED
                });
                Err(err)
            }
        }
    }

    /// Favorites or unfavorites the loaded article. The server's count replaces
    /// the local one; failures are only logged.
    pub async fn toggle_favorite(&self) -> Result<u32, ClientError> {
        let (slug, favorited) = match self.view.read().await.article() {
            Some(article) => (article.slug.clone(), article.favorited),
            None => return Err(ClientError::NotLoaded),
        };

        let result = if favorited {
            self.service.unfavorite(&slug).await
        } else {
            self.service.favorite(&slug).await
        };
        match result {
            Ok(updated) => {
                if let ArticleView::Ready(article) = &mut *self.view.write().await {
                    if article.slug == slug {
                        article.favorites_count = updated.favorites_count;
                        article.favorited = updated.favorited;
                    }
                }
                Ok(updated.favorites_count)
            }
            Err(err) => {
                warn!(%slug, error = %err, "favorite toggle failed");
                Err(err)
            }
        }
    }

    /// Deletes the loaded article after the user confirms. Only its author may
    /// delete it; anyone else is turned away without a request.
    pub async fn delete_article(&self) -> Result<DeleteOutcome, ClientError> {
        let username = self.session.username().await;
        let (slug, mine) = match self.view.read().await.article() {
            Some(article) => (
                article.slug.clone(),
                username.is_some_and(|u| article.is_written_by(&u)),
            ),
            None => return Err(ClientError::NotLoaded),
        };

        if !self.host.confirm(CONFIRM_DELETE) {
            return Ok(DeleteOutcome::Cancelled);
        }
        if !mine {
            self.host.notify(NOT_YOUR_ARTICLE);
            return Err(ClientError::NotAuthor);
        }

        match self.service.delete_article(&slug).await {
            Ok(()) => {
                info!(%slug, "article deleted");
                *self.view.write().await = ArticleView::Deleted;
                self.host.notify(ARTICLE_DELETED);
                self.host.invalidate_feeds();
                self.host.navigate(Route::Home);
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!(%slug, error = %err, "article delete rejected");
                self.host.notify(NOT_YOUR_ARTICLE);
                Err(err)
            }
        }
    }
}
