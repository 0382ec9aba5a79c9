mod host;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use conduit_core::{
    ArticleController, ArticleService, ClientConfig, FeedController, HttpArticleService,
    RelationshipStore, Route, SessionContext, Tab, User,
};
use reqwest::{redirect, ClientBuilder};
use tracing_subscriber::EnvFilter;

use crate::host::TerminalHost;

#[derive(Parser)]
#[command(name = "conduit", about = "Browse and act on a Conduit article feed")]
struct Cli {
    /// Override the API base url from the config file.
    #[arg(long, global = true)]
    api: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a feed page.
    Feed {
        #[arg(long, default_value = "global")]
        tab: Tab,
        /// Comma-separated tags, as they appear in the page fragment.
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List popular tags.
    Tags,
    /// Show one article.
    Article { slug: String },
    /// Like or unlike an article from the feed.
    Like { slug: String },
    /// Favorite or unfavorite an article from its page.
    Favorite { slug: String },
    /// Follow or unfollow an author.
    Follow { username: String },
    /// Delete one of your articles.
    Delete { slug: String },
    /// Store credentials for later commands.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        token: String,
    },
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::load();
    if let Some(api) = cli.api {
        config.api.base_url = api;
    }

    match cli.command {
        Command::Login { username, token } => {
            let user = User {
                username,
                email: String::new(),
                token,
                image: None,
            };
            config.update_session(Some(user))?;
            let store = load_store().await?;
            match store.take_redirect_after_login().await {
                Some(path) => println!("signed in, returning to {path}"),
                None => println!("signed in"),
            }
            return Ok(());
        }
        Command::Logout => {
            config.update_session(None)?;
            println!("signed out");
            return Ok(());
        }
        _ => {}
    }

    let session = match config.session.clone() {
        Some(user) => SessionContext::signed_in(user),
        None => SessionContext::anonymous(),
    };
    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent(config.api.user_agent.clone())
        .build()
        .context("failed to build HTTP client")?;
    let service: Arc<dyn ArticleService> = Arc::new(
        HttpArticleService::new(client, &config.api.base_url, session.clone())?
            .with_timeout(config.api.request_timeout()),
    );
    let store = load_store().await?;
    let host = Arc::new(TerminalHost::default());

    let feed = FeedController::new(service.clone(), store.clone(), session.clone(), host.clone())
        .with_fetch_delay(config.feed.fetch_delay());
    let article = ArticleController::new(service.clone(), store, session, host.clone());

    match cli.command {
        Command::Feed { tab, tags, page } => {
            if tab == Tab::Your && tags.is_some() {
                bail!("--tags filters the global listing and cannot be combined with --tab your");
            }
            let fragment = tags.unwrap_or_default();
            host.set_path(&Route::Home.path());
            let tab = (tab != Tab::Global).then_some(tab);
            feed.mount_at(&fragment, tab, Some(page)).await?;
            let state = feed.state().await;
            println!(
                "{} · page {}/{} · {} articles",
                state.active_tab.as_str(),
                state.current_page,
                state.page_count(),
                state.total_count
            );
            for a in &state.items {
                println!(
                    "{:<40} {:>4}♥ {}{} [{}]",
                    a.slug,
                    a.favorites_count,
                    a.author.username,
                    if a.author.following { " (following)" } else { "" },
                    a.tag_list.join(", ")
                );
            }
        }
        Command::Tags => {
            for tag in feed.load_tags().await? {
                println!("{tag}");
            }
        }
        Command::Article { slug } => {
            host.set_path(&Route::Article(slug.clone()).path());
            article.load(&slug).await?;
            if let Some(a) = article.article().await {
                println!(
                    "{}\n  by {} · {}♥\n\n{}",
                    a.title, a.author.username, a.favorites_count, a.body
                );
            }
        }
        Command::Like { slug } => {
            host.set_path(&Route::Home.path());
            let current = service.fetch_article(&slug).await?;
            let outcome = feed
                .toggle_like(&slug, current.favorited, current.favorites_count)
                .await?;
            println!("{outcome:?}");
        }
        Command::Favorite { slug } => {
            article.load(&slug).await?;
            let count = article.toggle_favorite().await?;
            println!("{slug}: {count}♥");
        }
        Command::Follow { username } => {
            let following = article.toggle_follow(&username).await?;
            println!("{username}: following = {following}");
        }
        Command::Delete { slug } => {
            host.set_path(&Route::Article(slug.clone()).path());
            article.load(&slug).await?;
            let outcome = article.delete_article().await?;
            println!("{outcome:?}");
        }
        Command::Login { .. } | Command::Logout => {}
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn load_store() -> Result<RelationshipStore> {
    let path = ClientConfig::relationship_store_path()?;
    Ok(RelationshipStore::load_from(&path).await)
}
