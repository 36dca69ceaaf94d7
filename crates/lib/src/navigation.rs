//! # Navigation
//!
//! Two routes and a one-shot handoff of the configuration between them. The
//! configuration rides on the navigation action itself and is consumed by
//! the destination when it mounts; nothing is stored globally.

use crate::config::Configuration;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Chat,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Chat => "/chat",
        }
    }

    /// Unknown paths land on the home screen.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/chat" | "chat" => Route::Chat,
            _ => Route::Home,
        }
    }
}

#[derive(Debug)]
pub struct Navigator {
    current: Route,
    state: Option<Configuration>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            state: None,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// In-app navigation, optionally carrying a configuration to the destination.
    pub fn navigate(&mut self, to: Route, state: Option<Configuration>) {
        debug!(
            "navigating to {} ({})",
            to.path(),
            if state.is_some() { "with state" } else { "no state" }
        );
        self.current = to;
        self.state = state;
    }

    /// Entering through a typed or bookmarked path: no state attached.
    pub fn open_path(&mut self, path: &str) {
        self.navigate(Route::from_path(path), None);
    }

    /// Hands the attached configuration to the destination. A second call yields `None`.
    pub fn take_state(&mut self) -> Option<Configuration> {
        self.state.take()
    }
}
