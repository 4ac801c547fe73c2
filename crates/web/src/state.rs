//! Application state shared across handlers.

use std::sync::Arc;

use user_directory_core::{IdAllocator, UserDirectory, UserStore};

use crate::config::DirectoryConfig;
use crate::live::LiveUpdates;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It is the composition root:
/// the one [`UserStore`] of the process lives here, next to the directory it
/// loads from and the id allocator the create form draws from.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DirectoryConfig,
    store: Arc<UserStore>,
    directory: Arc<dyn UserDirectory>,
    ids: Arc<dyn IdAllocator>,
    live: LiveUpdates,
}

impl AppState {
    /// Create a new application state with an empty store.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `directory` - Source of the user collection
    /// * `ids` - Id allocation strategy for newly created users
    #[must_use]
    pub fn new(
        config: DirectoryConfig,
        directory: Arc<dyn UserDirectory>,
        ids: Arc<dyn IdAllocator>,
    ) -> Self {
        let store = Arc::new(UserStore::new());
        let live = LiveUpdates::new();
        store.subscribe(Arc::new(live.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                directory,
                ids,
                live,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.inner.config
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn store(&self) -> &UserStore {
        &self.inner.store
    }

    /// Get a reference to the id allocator.
    #[must_use]
    pub fn ids(&self) -> &dyn IdAllocator {
        self.inner.ids.as_ref()
    }

    /// Get a reference to the live-update channel.
    #[must_use]
    pub fn live(&self) -> &LiveUpdates {
        &self.inner.live
    }

    /// Start a load in the background.
    ///
    /// The store enters the loading state before this returns, so a page
    /// rendered right after shows it.
    pub fn spawn_load(&self) {
        let generation = self.inner.store.begin_load();
        let store = Arc::clone(&self.inner.store);
        let directory = Arc::clone(&self.inner.directory);
        tokio::spawn(async move {
            store.finish_load(generation, directory.as_ref()).await;
        });
    }

    /// Trigger the first load, once per process.
    pub fn ensure_initial_load(&self) {
        if self.inner.store.begin_initial_load() {
            tracing::info!("starting initial user load");
            self.spawn_load();
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .finish_non_exhaustive()
    }
}
