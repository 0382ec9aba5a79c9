#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use conduit_core::{
    Article, ArticlePage, ArticleService, Author, ClientError, FeedRequest, Profile, Route,
    ViewHost,
};
use tokio::sync::Notify;

pub fn article(slug: &str, author: &str) -> Article {
    Article {
        slug: slug.to_owned(),
        title: format!("Title of {slug}"),
        description: String::new(),
        body: format!("Body of {slug}"),
        created_at: Utc.with_ymd_and_hms(2024, 10, 21, 7, 28, 0).unwrap(),
        updated_at: None,
        author: Author {
            username: author.to_owned(),
            image: None,
            bio: None,
            following: false,
        },
        favorited: false,
        favorites_count: 0,
        tag_list: Vec::new(),
        liked_by: Vec::new(),
    }
}

pub fn rejected() -> ClientError {
    ClientError::Status {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(String),
    List(FeedRequest),
    Follow(String),
    Unfollow(String),
    Favorite(String),
    Unfavorite(String),
    Delete(String),
    Tags,
}

/// In-process stand-in for the remote service. Records every call and answers
/// from canned data.
#[derive(Default)]
pub struct ScriptedService {
    pub calls: Mutex<Vec<Call>>,
    pub articles: Mutex<HashMap<String, Article>>,
    /// Listing answers keyed by offset; missing offsets answer an empty page.
    pub pages: Mutex<HashMap<u32, ArticlePage>>,
    /// When set, a listing at this offset waits for the gate before answering.
    pub gate: Mutex<Option<(u32, Arc<Notify>)>>,
    pub listing_requested: Notify,
    pub fail_fetch: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_follow: AtomicBool,
    pub fail_favorite: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_article(self: &Arc<Self>, article: Article) -> Arc<Self> {
        self.articles
            .lock()
            .unwrap()
            .insert(article.slug.clone(), article);
        self.clone()
    }

    pub fn with_page(
        self: &Arc<Self>,
        offset: u32,
        articles: Vec<Article>,
        total: u32,
    ) -> Arc<Self> {
        self.pages.lock().unwrap().insert(
            offset,
            ArticlePage {
                articles,
                articles_count: total,
            },
        );
        self.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<FeedRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn favorite_result(&self, slug: &str, favorited: bool) -> Result<Article, ClientError> {
        if self.fail_favorite.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        let mut articles = self.articles.lock().unwrap();
        let stored = articles
            .entry(slug.to_owned())
            .or_insert_with(|| article(slug, "someone"));
        if stored.favorited != favorited {
            stored.favorited = favorited;
            stored.favorites_count = if favorited {
                stored.favorites_count + 1
            } else {
                stored.favorites_count.saturating_sub(1)
            };
        }
        Ok(stored.clone())
    }

    fn follow_result(&self, username: &str, following: bool) -> Result<Profile, ClientError> {
        if self.fail_follow.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        Ok(Profile {
            username: username.to_owned(),
            image: None,
            bio: None,
            following,
        })
    }
}

#[async_trait]
impl ArticleService for ScriptedService {
    async fn fetch_article(&self, slug: &str) -> Result<Article, ClientError> {
        self.record(Call::Fetch(slug.to_owned()));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        self.articles
            .lock()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or(ClientError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: String::new(),
            })
    }

    async fn list_articles(&self, request: &FeedRequest) -> Result<ArticlePage, ClientError> {
        self.record(Call::List(request.clone()));
        self.listing_requested.notify_one();
        let gate = self
            .gate
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(offset, _)| *offset == request.offset)
            .map(|(_, notify)| notify.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&request.offset)
            .cloned()
            .unwrap_or_default())
    }

    async fn follow(&self, username: &str) -> Result<Profile, ClientError> {
        self.record(Call::Follow(username.to_owned()));
        self.follow_result(username, true)
    }

    async fn unfollow(&self, username: &str) -> Result<Profile, ClientError> {
        self.record(Call::Unfollow(username.to_owned()));
        self.follow_result(username, false)
    }

    async fn favorite(&self, slug: &str) -> Result<Article, ClientError> {
        self.record(Call::Favorite(slug.to_owned()));
        self.favorite_result(slug, true)
    }

    async fn unfavorite(&self, slug: &str) -> Result<Article, ClientError> {
        self.record(Call::Unfavorite(slug.to_owned()));
        self.favorite_result(slug, false)
    }

    async fn delete_article(&self, slug: &str) -> Result<(), ClientError> {
        self.record(Call::Delete(slug.to_owned()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        self.articles.lock().unwrap().remove(slug);
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<String>, ClientError> {
        self.record(Call::Tags);
        Ok(vec!["rust".into(), "tokio".into()])
    }
}

/// Records everything the controllers ask of the view.
pub struct RecordingHost {
    pub notices: Mutex<Vec<String>>,
    pub routes: Mutex<Vec<Route>>,
    pub fragments: Mutex<Vec<String>>,
    pub invalidations: Mutex<u32>,
    pub confirm_answer: AtomicBool,
    pub path: Mutex<String>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            routes: Mutex::new(Vec::new()),
            fragments: Mutex::new(Vec::new()),
            invalidations: Mutex::new(0),
            confirm_answer: AtomicBool::new(true),
            path: Mutex::new("/".to_owned()),
        })
    }

    pub fn at(path: &str) -> Arc<Self> {
        let host = Self::new();
        *host.path.lock().unwrap() = path.to_owned();
        host
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn fragments(&self) -> Vec<String> {
        self.fragments.lock().unwrap().clone()
    }
}

impl ViewHost for RecordingHost {
    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_owned());
    }

    fn confirm(&self, _message: &str) -> bool {
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }

    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn set_fragment(&self, fragment: &str) {
        self.fragments.lock().unwrap().push(fragment.to_owned());
    }

    fn invalidate_feeds(&self) {
        *self.invalidations.lock().unwrap() += 1;
    }
}
