use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Articles shown per feed page.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub author: Author,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub favorites_count: u32,
    #[serde(default)]
    pub tag_list: Vec<String>,
    /// Client-side overlay of who liked the article, mirrored from the relationship store.
    #[serde(default)]
    pub liked_by: Vec<String>,
}

impl Article {
    pub fn is_written_by(&self, username: &str) -> bool {
        self.author.username == username
    }
}

/// Body of follow/unfollow responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub token: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    #[serde(default)]
    pub articles_count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    Your,
    #[default]
    Global,
    Tag,
    Favorited,
    MyArticles,
    FavoritedArticles,
    Feed,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Your => "your",
            Tab::Global => "global",
            Tab::Tag => "tag",
            Tab::Favorited => "favorited",
            Tab::MyArticles => "myArticles",
            Tab::FavoritedArticles => "favoritedArticles",
            Tab::Feed => "feed",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "your" => Ok(Tab::Your),
            "global" => Ok(Tab::Global),
            "tag" => Ok(Tab::Tag),
            "favorited" => Ok(Tab::Favorited),
            "myArticles" => Ok(Tab::MyArticles),
            "favoritedArticles" => Ok(Tab::FavoritedArticles),
            "feed" => Ok(Tab::Feed),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

// The backend wraps single articles either once or twice under "article".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArticlePayload {
    Nested { article: Article },
    Flat(Article),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArticleEnvelope {
    article: ArticlePayload,
}

impl ArticleEnvelope {
    pub(crate) fn into_article(self) -> Article {
        match self.article {
            ArticlePayload::Nested { article } => article,
            ArticlePayload::Flat(article) => article,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    pub(crate) profile: Profile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsEnvelope {
    #[serde(default)]
    pub(crate) tags: Vec<String>,
}
