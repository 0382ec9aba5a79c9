use std::io::{BufRead, Write};
use std::sync::Mutex;

use conduit_core::{Route, ViewHost};
use tracing::info;

/// Prints notices to stdout and reads confirmations from stdin.
#[derive(Debug)]
pub struct TerminalHost {
    path: Mutex<String>,
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self {
            path: Mutex::new("/".to_owned()),
        }
    }
}

impl TerminalHost {
    pub fn set_path(&self, path: &str) {
        if let Ok(mut current) = self.path.lock() {
            *current = path.to_owned();
        }
    }
}

impl ViewHost for TerminalHost {
    fn notify(&self, message: &str) {
        println!("» {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }

    fn navigate(&self, route: Route) {
        let path = route.path();
        if route == Route::Login {
            println!("» sign in with `conduit login --username <name> --token <jwt>`");
        }
        self.set_path(&path);
        info!(%path, "navigated");
    }

    fn current_path(&self) -> String {
        self.path
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|_| "/".to_owned())
    }

    fn set_fragment(&self, fragment: &str) {
        info!(%fragment, "fragment updated");
    }

    fn invalidate_feeds(&self) {
        info!("cached feed listings invalidated");
    }
}
