use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ClientError;
use crate::models::{
    Article, ArticleEnvelope, ArticlePage, Profile, ProfileEnvelope, TagsEnvelope,
};
use crate::session::SessionContext;

/// Which listing endpoint a feed page is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedEndpoint {
    /// `GET /articles`
    Global,
    /// `GET /articles/feed`
    Personal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedRequest {
    pub endpoint: FeedEndpoint,
    pub offset: u32,
    pub limit: u32,
    /// Comma-joined tag filter.
    pub tag: Option<String>,
}

/// Remote article and profile operations against the Conduit API.
#[async_trait]
pub trait ArticleService: Send + Sync {
    async fn fetch_article(&self, slug: &str) -> Result<Article, ClientError>;
    async fn list_articles(&self, request: &FeedRequest) -> Result<ArticlePage, ClientError>;
    async fn follow(&self, username: &str) -> Result<Profile, ClientError>;
    async fn unfollow(&self, username: &str) -> Result<Profile, ClientError>;
    async fn favorite(&self, slug: &str) -> Result<Article, ClientError>;
    async fn unfavorite(&self, slug: &str) -> Result<Article, ClientError>;
    async fn delete_article(&self, slug: &str) -> Result<(), ClientError>;
    async fn tags(&self) -> Result<Vec<String>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpArticleService {
    client: Client,
    base_url: Url,
    session: SessionContext,
    timeout: Duration,
}

impl HttpArticleService {
    pub fn new(
        client: Client,
        base_url: &str,
        session: SessionContext,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            session,
            timeout: Duration::from_secs(10),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "conduit request");
        let builder = self.client.request(method, url).timeout(self.timeout);
        match self.session.token().await {
            Some(token) => {
                builder.header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
            }
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let resp = Self::send(builder).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn article_call(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<Article, ClientError> {
        let url = self.endpoint(segments)?;
        let envelope: ArticleEnvelope = Self::send_json(self.request(method, url).await).await?;
        Ok(envelope.into_article())
    }

    async fn profile_call(&self, method: Method, username: &str) -> Result<Profile, ClientError> {
        let url = self.endpoint(&["profiles", username, "follow"])?;
        let envelope: ProfileEnvelope = Self::send_json(self.request(method, url).await).await?;
        Ok(envelope.profile)
    }
}

#[async_trait]
impl ArticleService for HttpArticleService {
    async fn fetch_article(&self, slug: &str) -> Result<Article, ClientError> {
        // The backend serves single articles over POST.
        self.article_call(Method::POST, &["articles", slug]).await
    }

    async fn list_articles(&self, request: &FeedRequest) -> Result<ArticlePage, ClientError> {
        let mut url = match request.endpoint {
            FeedEndpoint::Global => self.endpoint(&["articles"])?,
            FeedEndpoint::Personal => self.endpoint(&["articles", "feed"])?,
        };
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("offset", &request.offset.to_string())
                .append_pair("limit", &request.limit.to_string());
            if let Some(tag) = &request.tag {
                query.append_pair("tag", tag);
            }
        }
        Self::send_json(self.request(Method::GET, url).await).await
    }

    async fn follow(&self, username: &str) -> Result<Profile, ClientError> {
        self.profile_call(Method::POST, username).await
    }

    async fn unfollow(&self, username: &str) -> Result<Profile, ClientError> {
        self.profile_call(Method::DELETE, username).await
    }

    async fn favorite(&self, slug: &str) -> Result<Article, ClientError> {
        self.article_call(Method::POST, &["articles", slug, "favorite"])
            .await
    }

    async fn unfavorite(&self, slug: &str) -> Result<Article, ClientError> {
        self.article_call(Method::DELETE, &["articles", slug, "favorite"])
            .await
    }

    async fn delete_article(&self, slug: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["articles", slug])?;
        Self::send(self.request(Method::DELETE, url).await).await?;
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint(&["tags"])?;
        let envelope: TagsEnvelope = Self::send_json(self.request(Method::GET, url).await).await?;
        Ok(envelope.tags)
    }
}
