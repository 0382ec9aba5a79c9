pub mod api;
pub mod article;
pub mod config;
pub mod error;
pub mod feed;
pub mod feed_state;
pub mod fragment;
pub mod host;
pub mod models;
pub mod session;
pub mod store;

pub use api::{ArticleService, FeedEndpoint, FeedRequest, HttpArticleService};
pub use article::{ArticleController, ArticleView, DeleteOutcome};
pub use config::{ApiConfig, ClientConfig, FeedConfig};
pub use error::{ClientError, ConfigError};
pub use feed::{FeedController, FetchOutcome, LikeOutcome};
pub use feed_state::{FeedAction, FeedKey, FeedState, PlannedFetch, Transition};
pub use host::{Route, ViewHost};
pub use models::{Article, ArticlePage, Author, Profile, Tab, User, PAGE_SIZE};
pub use session::SessionContext;
pub use store::{RelationshipData, RelationshipStore};
