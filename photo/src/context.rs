use std::sync::Arc;

use fetcher::{client::HttpFetcher, config::SessionConfig, traits::Fetcher};
use image_cache::SharedCache;
use tokio::runtime::Handle;

use crate::{errors::PhotoError, notification::NotificationCenter, ui_context::UiContext};

/// Collaborators shared by every photo of a browser: the cache, the
/// network layer, the UI context and the notification center. Cloning is
/// cheap, every field is a handle.
#[derive(Clone)]
pub struct PhotoContext {
    pub cache: SharedCache,
    pub fetcher: Arc<dyn Fetcher>,
    pub ui: UiContext,
    pub notifications: NotificationCenter,
    pub(crate) runtime: Handle,
}

impl PhotoContext {
    /// Must be called from inside a tokio runtime, loads are spawned onto it.
    pub fn new(
        cache: SharedCache,
        fetcher: Arc<dyn Fetcher>,
        ui: UiContext,
    ) -> Result<Self, PhotoError> {
        Ok(Self::with_runtime(cache, fetcher, ui, Handle::try_current()?))
    }

    pub fn with_runtime(
        cache: SharedCache,
        fetcher: Arc<dyn Fetcher>,
        ui: UiContext,
        runtime: Handle,
    ) -> Self {
        Self {
            cache,
            fetcher,
            ui,
            notifications: NotificationCenter::new(),
            runtime,
        }
    }

    /// Context backed by [`HttpFetcher`].
    pub fn http(
        cache: SharedCache,
        session: &SessionConfig,
        ui: UiContext,
    ) -> Result<Self, PhotoError> {
        let fetcher = HttpFetcher::new(session)?;

        Self::new(cache, Arc::new(fetcher), ui)
    }
}
