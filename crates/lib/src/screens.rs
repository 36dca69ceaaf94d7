//! # Screens
//!
//! The two screen models. [`HomeScreen`] edits the configuration and can
//! re-chunk the stored files; [`ChatScreen`] uploads, asks, and manages
//! stored files using the configuration it received when it was mounted.
//! The components inside a screen never share status, so a failed query
//! leaves the file list alone and vice versa.

use crate::config::{ConfigStore, Configuration};
use crate::documents::DocumentManager;
use crate::ingest::{Rechunker, Uploader};
use crate::navigation::{Navigator, Route};
use crate::query::QueryWorkflow;
use tracing::info;

#[derive(Debug, Default)]
pub struct HomeScreen {
    pub store: ConfigStore,
    pub rechunk: Rechunker,
}

impl HomeScreen {
    /// Every visit starts from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigates to the chat screen, handing over a copy of the configuration.
    pub fn go_to_chat(&self, navigator: &mut Navigator) {
        navigator.navigate(Route::Chat, Some(self.store.to_payload()));
    }
}

#[derive(Debug)]
pub struct ChatScreen {
    config: Configuration,
    pub uploader: Uploader,
    pub query: QueryWorkflow,
    pub documents: DocumentManager,
}

impl ChatScreen {
    /// Mounts the screen, consuming the navigation state.
    ///
    /// Reached without a configuration (e.g. a direct link), it falls back
    /// to the defaults.
    pub fn mount(navigator: &mut Navigator) -> Self {
        let config = match navigator.take_state() {
            Some(config) => config,
            None => {
                info!("chat mounted without configuration, using defaults");
                Configuration::default()
            }
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Configuration) -> Self {
        Self {
            config,
            uploader: Uploader::new(),
            query: QueryWorkflow::new(config),
            documents: DocumentManager::new(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }
}
