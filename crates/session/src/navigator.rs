//! Navigation seam. Redirects are side effects the application layer performs.

use std::sync::Mutex;

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
///
/// Useful for headless hosts (the CLI) and tests.
#[derive(Debug, Default)]
pub struct NavigationLog {
    visited: Mutex<Vec<String>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.visited.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visited
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last()
            .cloned()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.visited
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(path.to_string());
    }
}
