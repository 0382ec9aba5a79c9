use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ArticleService;
use crate::error::ClientError;
use crate::feed_state::{FeedAction, FeedState, PlannedFetch};
use crate::host::{Route, ViewHost};
use crate::models::Tab;
use crate::session::SessionContext;
use crate::store::RelationshipStore;

pub const FEED_LOAD_FAILED: &str = "Failed to load articles";
pub const SIGN_IN_TO_LIKE: &str = "You need to sign in to like articles";

/// Pause before each listing request so quick tab switches don't flash.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the listing.
    Applied,
    /// A newer request was issued while this one was in flight; its response was dropped.
    Stale,
    /// The state change did not alter the listing, so nothing was requested.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    LoginRequired,
    Liked,
    Unliked,
}

/// State for the paginated, tag-filterable article listing.
#[derive(Clone)]
pub struct FeedController {
    service: Arc<dyn ArticleService>,
    store: RelationshipStore,
    session: SessionContext,
    host: Arc<dyn ViewHost>,
    state: Arc<RwLock<FeedState>>,
    tags: Arc<RwLock<Vec<String>>>,
    generation: Arc<AtomicU64>,
    fetch_delay: Duration,
}

impl FeedController {
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
            state: Arc::new(RwLock::new(FeedState::default())),
            tags: Arc::new(RwLock::new(Vec::new())),
            generation: Arc::new(AtomicU64::new(0)),
            fetch_delay: DEFAULT_FETCH_DELAY,
        }
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub async fn state(&self) -> FeedState {
        self.state.read().await.clone()
    }

    pub async fn page_count(&self) -> u32 {
        self.state.read().await.page_count()
    }

    /// Popular tags, as last loaded by [`FeedController::load_tags`].
    pub async fn popular_tags(&self) -> Vec<String> {
        self.tags.read().await.clone()
    }

    /// Brings the view up: adopts the fragment, loads the first listing and
    /// overlays cached follow flags onto it.
    pub async fn mount(&self, fragment: &str) -> Result<FetchOutcome, ClientError> {
        self.mount_at(fragment, None, None).await
    }

    /// Mounts with a starting tab and page on top of the fragment. All of them are
    /// applied before the one fetch the mount makes.
    pub async fn mount_at(
        &self,
        fragment: &str,
        tab: Option<Tab>,
        page: Option<u32>,
    ) -> Result<FetchOutcome, ClientError> {
        {
            let mut state = self.state.write().await;
            state.reduce(FeedAction::FragmentChanged(fragment.to_owned()));
            if let Some(tab) = tab {
                state.reduce(FeedAction::SelectTab(tab));
            }
            if let Some(page) = page {
                state.reduce(FeedAction::GoToPage(page));
            }
        }
        let outcome = self.fetch_page().await?;
        self.restore_following_from_cache().await;
        Ok(outcome)
    }

    pub async fn select_tab(&self, tab: Tab) -> Result<FetchOutcome, ClientError> {
        self.dispatch(FeedAction::SelectTab(tab)).await
    }

    pub async fn select_tags(&self, tags: Vec<String>) -> Result<FetchOutcome, ClientError> {
        self.dispatch(FeedAction::SelectTags(tags)).await
    }

    /// Adds the tag to the selection, or removes it if already selected.
    pub async fn toggle_tag(&self, tag: &str) -> Result<FetchOutcome, ClientError> {
        self.dispatch(FeedAction::ToggleTag(tag.to_owned())).await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<FetchOutcome, ClientError> {
        self.dispatch(FeedAction::GoToPage(page)).await
    }

    /// Pager callback; `selected` is zero-based.
    pub async fn page_clicked(&self, selected: u32) -> Result<FetchOutcome, ClientError> {
        self.go_to_page(selected.saturating_add(1)).await
    }

    /// Applies a fragment change that came from outside (history, shared link).
    pub async fn on_fragment_changed(&self, fragment: &str) -> Result<FetchOutcome, ClientError> {
        self.dispatch(FeedAction::FragmentChanged(fragment.to_owned()))
            .await
    }

    async fn dispatch(&self, action: FeedAction) -> Result<FetchOutcome, ClientError> {
        let transition = self.state.write().await.reduce(action);
        if let Some(fragment) = &transition.fragment {
            self.host.set_fragment(fragment);
        }
        if transition.refetch {
            self.fetch_page().await
        } else {
            Ok(FetchOutcome::Unchanged)
        }
    }

    /// Requests the listing for the current tab, tags and page. Only the most
    /// recently issued request may write its response into the state.
    pub async fn fetch_page(&self) -> Result<FetchOutcome, ClientError> {
        let authenticated = self.session.is_authenticated().await;
        let (ticket, key, request) = {
            let mut state = self.state.write().await;
            let request = loop {
                match state.plan_fetch(authenticated) {
                    PlannedFetch::Request(request) => break request,
                    PlannedFetch::FallBackToGlobal => {
                        info!("tag listing requested with no tags selected, using global listing");
                        state.reduce(FeedAction::TagSelectionEmptied);
                    }
                }
            };
            state.loading = true;
            state.error = None;
            let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (ticket, state.key(), request)
        };

        debug!(ticket, tab = key.tab.as_str(), page = key.page, "fetching feed page");
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        let result = self.service.list_articles(&request).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(
                ticket,
                tab = key.tab.as_str(),
                page = key.page,
                "discarding stale feed response"
            );
            return Ok(FetchOutcome::Stale);
        }
        state.loading = false;
        match result {
            Ok(page) => {
                state.items = page.articles;
                state.total_count = page.articles_count;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                warn!(error = %err, "failed to load feed page");
                state.error = Some(FEED_LOAD_FAILED.to_owned());
                Err(err)
            }
        }
    }

    /// Likes or unlikes an article optimistically. On server failure the
    /// listing's favorite flag and count go back to the values passed in; the
    /// relationship store keeps the toggled like.
    pub async fn toggle_like(
        &self,
        slug: &str,
        current_favorited: bool,
        current_count: u32,
    ) -> Result<LikeOutcome, ClientError> {
        let Some(username) = self.session.username().await else {
            let path = self.host.current_path();
            self.store.set_redirect_after_login(&path).await;
            self.host.notify(SIGN_IN_TO_LIKE);
            self.host.navigate(Route::Login);
            return Ok(LikeOutcome::LoginRequired);
        };

        let mut liked_by = self.store.liked_by(slug).await;
        let like = !liked_by.contains(&username);
        let count = if like {
            current_count.saturating_add(1)
        } else {
            current_count.saturating_sub(1)
        };
        if like {
            liked_by.push(username.clone());
        } else {
            liked_by.retain(|u| *u != username);
        }
        self.store.set_liked_by(slug, liked_by.clone()).await;
        self.state.write().await.patch_items(slug, |article| {
            article.favorited = like;
            article.favorites_count = count;
            article.liked_by = liked_by.clone();
        });

        let result = if like {
            self.service.favorite(slug).await
        } else {
            self.service.unfavorite(slug).await
        };
        match result {
            Ok(_) => Ok(if like {
                LikeOutcome::Liked
            } else {
                LikeOutcome::Unliked
            }),
            Err(err) => {
                warn!(%slug, error = %err, "failed to update favorite, rolling back");
                self.state.write().await.patch_items(slug, |article| {
                    article.favorited = current_favorited;
                    article.favorites_count = current_count;
                });
                Err(err)
            }
        }
    }

    /// Follows or unfollows `username` and updates every listed article by them
    /// once the server confirms.
    pub async fn toggle_follow(
        &self,
        username: &str,
        currently_following: bool,
    ) -> Result<bool, ClientError> {
        let result = if currently_following {
            self.service.unfollow(username).await
        } else {
            self.service.follow(username).await
        };
        let profile = match result {
            Ok(profile) => profile,
            Err(err) => {
                warn!(%username, error = %err, "failed to update follow status");
                return Err(err);
            }
        };

        self.store.set_following(username, profile.following).await;
        let mut state = self.state.write().await;
        for article in state
            .items
            .iter_mut()
            .filter(|a| a.author.username == username)
        {
            article.author.following = profile.following;
        }
        Ok(profile.following)
    }

    /// Overlays cached follow flags onto the listed authors. Authors missing from
    /// the cache keep the server's flag.
    pub async fn restore_following_from_cache(&self) {
        let cached = self.store.following_snapshot().await;
        if cached.is_empty() {
            return;
        }
        let mut state = self.state.write().await;
        for article in state.items.iter_mut() {
            if let Some(following) = cached.get(&article.author.username) {
                article.author.following = *following;
            }
        }
    }

    pub async fn load_tags(&self) -> Result<Vec<String>, ClientError> {
        let tags = self.service.tags().await?;
        *self.tags.write().await = tags.clone();
        Ok(tags)
    }
}
