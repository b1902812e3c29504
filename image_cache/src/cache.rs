use std::sync::Arc;

use bytes::Bytes;
use common::decoded_image::DecodedImage;
use fetcher::{
    request::{Request, RequestFingerprint},
    traits::ResponseMetadata,
};
use strum_macros::{Display, EnumString};
use tracing::debug;

use crate::{
    config::CacheConfig,
    memory_cache::{MemoryImageCache, MemoryResponseCache},
    traits::{ImageCache, RequestResponseCache},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CacheMode {
    Image,
    RequestResponse,
}

/// The process wide cache handed to every photo. Exactly one of the two
/// strategies backs it, callers pick their code path with
/// [`SharedCache::supports_request_fingerprint`].
#[derive(Clone)]
pub enum SharedCache {
    Image(Arc<dyn ImageCache>),
    RequestResponse(Arc<dyn RequestResponseCache>),
}

impl SharedCache {
    pub fn memory(mode: CacheMode, config: &CacheConfig) -> Self {
        match mode {
            CacheMode::Image => Self::Image(Arc::new(MemoryImageCache::new(config))),
            CacheMode::RequestResponse => {
                Self::RequestResponse(Arc::new(MemoryResponseCache::new(config)))
            }
        }
    }

    pub fn mode(&self) -> CacheMode {
        match self {
            Self::Image(_) => CacheMode::Image,
            Self::RequestResponse(_) => CacheMode::RequestResponse,
        }
    }

    pub fn supports_request_fingerprint(&self) -> bool {
        matches!(self, Self::RequestResponse(_))
    }

    pub fn image_for_key(&self, key: &str) -> Option<Arc<DecodedImage>> {
        match self {
            Self::Image(cache) => cache.image_for_key(key),
            Self::RequestResponse(_) => None,
        }
    }

    pub fn image_for_request(&self, fingerprint: &RequestFingerprint) -> Option<Arc<DecodedImage>> {
        match self {
            Self::RequestResponse(cache) => cache.image_for_request(fingerprint),
            Self::Image(_) => None,
        }
    }

    pub fn set_image(&self, image: Arc<DecodedImage>, key: &str) {
        match self {
            Self::Image(cache) => cache.set_image(image, key),
            Self::RequestResponse(_) => {
                debug!("Ignoring decoded image for {}, cache stores responses", key)
            }
        }
    }

    pub fn set_response_data(&self, data: Bytes, response: ResponseMetadata, request: Request) {
        match self {
            Self::RequestResponse(cache) => cache.set_response_data(data, response, request),
            Self::Image(_) => debug!(
                "Ignoring response for {}, cache stores decoded images",
                request.url()
            ),
        }
    }

    pub fn remove_all(&self) {
        match self {
            Self::Image(cache) => cache.remove_all_images(),
            Self::RequestResponse(cache) => cache.remove_all_responses(),
        }
    }
}
