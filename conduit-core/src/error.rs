use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("base url cannot carry path segments: {0}")]
    BaseUrl(String),
    #[error("a signed-in user is required")]
    Unauthenticated,
    #[error("only the author can delete this article")]
    NotAuthor,
    #[error("no article is loaded")]
    NotLoaded,
}

impl ClientError {
    /// True when the server answered with 401 or 403.
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                *status == reqwest::StatusCode::UNAUTHORIZED
                    || *status == reqwest::StatusCode::FORBIDDEN
            }
            Self::Unauthenticated | Self::NotAuthor => true,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory on this platform")]
    NoConfigDir,
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config format error: {0}")]
    Json(#[from] serde_json::Error),
}
