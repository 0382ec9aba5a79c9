/// Views the controllers can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Article(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Login => "/login".to_owned(),
            Route::Article(slug) => format!("/article/{slug}"),
        }
    }
}

/// The surface that hosts a mounted view: alerts, confirmation prompts, navigation,
/// the addressable fragment and cached listings.
pub trait ViewHost: Send + Sync {
    /// Shows a blocking notice to the user.
    fn notify(&self, message: &str);

    /// Asks the user a yes/no question.
    fn confirm(&self, message: &str) -> bool;

    fn navigate(&self, route: Route);

    /// Path of the view currently shown, used as the post-login return target.
    fn current_path(&self) -> String;

    /// Replaces the addressable fragment (without the leading `#`).
    fn set_fragment(&self, fragment: &str);

    /// Drops any cached feed listings so the next feed mount refetches.
    fn invalidate_feeds(&self);
}
