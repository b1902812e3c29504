use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use common::{content_mode::ContentMode, decoded_image::DecodedImage};
use fetcher::request::Request;
use metrics::{Metrics, put_metric};
use tracing::debug;

use crate::context::PhotoContext;

/// What a photo browser needs from each item it pages through.
pub trait PhotoSource: Send + Sync {
    fn index(&self) -> usize;
    fn set_index(&self, index: usize);
    fn underlying_image(&self) -> Option<Arc<DecodedImage>>;
    fn caption(&self) -> Option<String>;
    fn content_mode(&self) -> ContentMode;
    fn set_content_mode(&self, content_mode: ContentMode);
    fn load_underlying_image_and_notify(self: Arc<Self>);
    fn check_cache(&self);
}

/// One image in a browser, either supplied in memory or fetched from
/// `source_url`. An in-memory image given together with a URL acts as a
/// placeholder until the load replaces it.
pub struct Photo {
    index: AtomicUsize,
    image: RwLock<Option<Arc<DecodedImage>>>,
    caption: RwLock<Option<String>>,
    content_mode: RwLock<ContentMode>,
    should_cache_response: AtomicBool,
    pub(crate) source_url: Option<String>,
    pub(crate) request_headers: Option<HashMap<String, String>>,
    pub(crate) context: PhotoContext,
}

pub struct PhotoBuilder {
    context: PhotoContext,
    index: usize,
    image: Option<Arc<DecodedImage>>,
    caption: Option<String>,
    content_mode: ContentMode,
    source_url: Option<String>,
    request_headers: Option<HashMap<String, String>>,
    should_cache_response: bool,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Photo {
    pub fn builder(context: PhotoContext) -> PhotoBuilder {
        PhotoBuilder::new(context)
    }

    pub fn photo_with_image(context: PhotoContext, image: impl Into<Arc<DecodedImage>>) -> Arc<Self> {
        Self::builder(context).set_image(image).build()
    }

    pub fn photo_with_image_url(context: PhotoContext, url: impl Into<String>) -> Arc<Self> {
        Self::builder(context).set_source_url(url).build()
    }

    pub fn photo_with_image_url_and_holder(
        context: PhotoContext,
        url: impl Into<String>,
        holder: Option<Arc<DecodedImage>>,
    ) -> Arc<Self> {
        Self::builder(context)
            .set_source_url(url)
            .set_placeholder(holder)
            .build()
    }

    pub fn photo_with_image_url_headers_and_holder(
        context: PhotoContext,
        url: impl Into<String>,
        headers: Option<HashMap<String, String>>,
        holder: Option<Arc<DecodedImage>>,
    ) -> Arc<Self> {
        Self::builder(context)
            .set_source_url(url)
            .set_request_headers(headers)
            .set_placeholder(holder)
            .build()
    }

    pub fn index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub fn set_index(&self, index: usize) {
        self.index.store(index, Ordering::Relaxed);
    }

    pub fn image(&self) -> Option<Arc<DecodedImage>> {
        read(&self.image).clone()
    }

    pub(crate) fn set_image(&self, image: Arc<DecodedImage>) {
        *write(&self.image) = Some(image);
    }

    pub fn caption(&self) -> Option<String> {
        read(&self.caption).clone()
    }

    pub fn set_caption(&self, caption: Option<String>) {
        *write(&self.caption) = caption;
    }

    pub fn content_mode(&self) -> ContentMode {
        *read(&self.content_mode)
    }

    pub fn set_content_mode(&self, content_mode: ContentMode) {
        *write(&self.content_mode) = content_mode;
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn request_headers(&self) -> Option<&HashMap<String, String>> {
        self.request_headers.as_ref()
    }

    pub fn should_cache_response(&self) -> bool {
        self.should_cache_response.load(Ordering::Relaxed)
    }

    pub fn set_should_cache_response(&self, should_cache_response: bool) {
        self.should_cache_response
            .store(should_cache_response, Ordering::Relaxed);
    }

    /// The request used both to fetch `source_url` and to key it in a
    /// response cache, so lookups and writes always agree.
    pub(crate) fn request_for(&self, source_url: &str) -> Request {
        let builder = Request::builder().set_url(source_url);

        match &self.request_headers {
            Some(headers) => {
                // names differing only in case collapse to one header, sorting
                // makes the surviving value independent of map order
                let mut headers: Vec<_> = headers.iter().collect();
                headers.sort();

                builder.set_headers(headers).build()
            }
            None => builder.build(),
        }
    }

    /// Fills `image` from the shared cache if an entry exists for this
    /// photo. Missing entries leave the photo untouched.
    pub fn check_cache(&self) {
        let Some(source_url) = self.source_url.as_deref() else {
            return;
        };

        if !self.should_cache_response() {
            return;
        }

        let cache = &self.context.cache;
        let cached = if cache.supports_request_fingerprint() {
            cache.image_for_request(&self.request_for(source_url).fingerprint())
        } else {
            cache.image_for_key(source_url)
        };

        let mode = cache.mode().to_string();

        match cached {
            Some(image) => {
                debug!("Cache hit for {}", source_url);
                put_metric!(Metrics::CacheHit, 1, "mode" => mode);

                self.set_image(image);
            }
            None => {
                debug!("Cache miss for {}", source_url);
                put_metric!(Metrics::CacheMiss, 1, "mode" => mode);
            }
        }
    }
}

impl Debug for Photo {
    fn fmt(&self, format: &mut Formatter) -> FmtResult {
        format
            .debug_struct("Photo")
            .field("index", &self.index())
            .field("source_url", &self.source_url)
            .field("caption", &self.caption())
            .field("content_mode", &self.content_mode())
            .field("has_image", &self.image().is_some())
            .field("should_cache_response", &self.should_cache_response())
            .finish()
    }
}

impl PhotoSource for Photo {
    fn index(&self) -> usize {
        Photo::index(self)
    }

    fn set_index(&self, index: usize) {
        Photo::set_index(self, index)
    }

    fn underlying_image(&self) -> Option<Arc<DecodedImage>> {
        self.image()
    }

    fn caption(&self) -> Option<String> {
        Photo::caption(self)
    }

    fn content_mode(&self) -> ContentMode {
        Photo::content_mode(self)
    }

    fn set_content_mode(&self, content_mode: ContentMode) {
        Photo::set_content_mode(self, content_mode)
    }

    fn load_underlying_image_and_notify(self: Arc<Self>) {
        self.load_image_and_notify();
    }

    fn check_cache(&self) {
        Photo::check_cache(self)
    }
}

impl PhotoBuilder {
    pub fn new(context: PhotoContext) -> Self {
        Self {
            context,
            index: 0,
            image: None,
            caption: None,
            content_mode: ContentMode::default(),
            source_url: None,
            request_headers: None,
            should_cache_response: false,
        }
    }

    pub fn set_index(mut self, index: usize) -> Self {
        self.index = index;

        self
    }

    pub fn set_image(mut self, image: impl Into<Arc<DecodedImage>>) -> Self {
        self.image = Some(image.into());

        self
    }

    pub fn set_placeholder(mut self, holder: Option<Arc<DecodedImage>>) -> Self {
        self.image = holder;

        self
    }

    pub fn set_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());

        self
    }

    pub fn set_content_mode(mut self, content_mode: ContentMode) -> Self {
        self.content_mode = content_mode;

        self
    }

    pub fn set_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());

        self
    }

    pub fn set_request_headers(mut self, headers: Option<HashMap<String, String>>) -> Self {
        self.request_headers = headers;

        self
    }

    pub fn set_should_cache_response(mut self, should_cache_response: bool) -> Self {
        self.should_cache_response = should_cache_response;

        self
    }

    pub fn build(self) -> Arc<Photo> {
        Arc::new(Photo {
            index: AtomicUsize::new(self.index),
            image: RwLock::new(self.image),
            caption: RwLock::new(self.caption),
            content_mode: RwLock::new(self.content_mode),
            should_cache_response: AtomicBool::new(self.should_cache_response),
            source_url: self.source_url,
            request_headers: self.request_headers,
            context: self.context,
        })
    }
}
