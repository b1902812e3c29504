use std::sync::Arc;

use bytes::Bytes;
use common::decoded_image::DecodedImage;
use fetcher::{
    request::{Request, RequestFingerprint},
    traits::ResponseMetadata,
};
use mini_moka::sync::Cache;
use tracing::{debug, trace};

use crate::{
    config::CacheConfig,
    traits::{CachedResponse, ImageCache, RequestResponseCache},
};

fn build_cache<K, V>(config: &CacheConfig) -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let mut builder = Cache::builder().max_capacity(config.max_entries);

    if let Some(time_to_live) = config.time_to_live {
        builder = builder.time_to_live(time_to_live);
    }

    builder.build()
}

pub struct MemoryImageCache {
    images: Cache<String, Arc<DecodedImage>>,
}

impl MemoryImageCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            images: build_cache(config),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl ImageCache for MemoryImageCache {
    fn image_for_key(&self, key: &str) -> Option<Arc<DecodedImage>> {
        self.images.get(&key.to_string())
    }

    fn set_image(&self, image: Arc<DecodedImage>, key: &str) {
        trace!("Storing decoded image under {}", key);
        self.images.insert(key.to_string(), image);
    }

    fn remove_image(&self, key: &str) {
        self.images.invalidate(&key.to_string());
    }

    fn remove_all_images(&self) {
        self.images.invalidate_all();
    }
}

/// Keeps the raw response body around and decodes it again on every lookup,
/// the same way an HTTP cache hands bytes back to its caller.
pub struct MemoryResponseCache {
    responses: Cache<RequestFingerprint, Arc<CachedResponse>>,
}

impl MemoryResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            responses: build_cache(config),
        }
    }
}

impl Default for MemoryResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl RequestResponseCache for MemoryResponseCache {
    fn image_for_request(&self, fingerprint: &RequestFingerprint) -> Option<Arc<DecodedImage>> {
        let cached = self.responses.get(fingerprint)?;

        match DecodedImage::decode(&cached.data) {
            Ok(image) => Some(Arc::new(image)),
            Err(err) => {
                debug!("Cached response for {} is not an image: {}", cached.request.url(), err);
                None
            }
        }
    }

    fn cached_response(&self, fingerprint: &RequestFingerprint) -> Option<Arc<CachedResponse>> {
        self.responses.get(fingerprint)
    }

    fn set_response_data(&self, data: Bytes, response: ResponseMetadata, request: Request) {
        let fingerprint = request.fingerprint();
        trace!("Storing {} byte response under {}", data.len(), fingerprint);

        self.responses.insert(
            fingerprint,
            Arc::new(CachedResponse {
                data,
                response,
                request,
            }),
        );
    }

    fn remove_response(&self, fingerprint: &RequestFingerprint) {
        self.responses.invalidate(fingerprint);
    }

    fn remove_all_responses(&self) {
        self.responses.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use common::fixtures;
    use fetcher::{reqwest::header::HeaderMap, traits::ResponseMetadata};

    use super::*;

    fn metadata(etag: Option<&str>) -> ResponseMetadata {
        let mut headers = HeaderMap::new();
        if let Some(etag) = etag {
            headers.insert("etag", etag.parse().unwrap());
        }

        ResponseMetadata {
            status: 200,
            url: "http://x/a.gif".to_string(),
            headers,
        }
    }

    fn request() -> Request {
        Request::builder()
            .set_url("http://x/a.gif")
            .set_header("Authorization", "t")
            .build()
    }

    #[test]
    fn test_image_cache_round_trip() {
        let cache = MemoryImageCache::default();
        let image = Arc::new(
            DecodedImage::decode(&fixtures::png([1, 2, 3, 255], 2, 2)).unwrap(),
        );

        assert!(cache.image_for_key("http://x/a.png").is_none());

        cache.set_image(image.clone(), "http://x/a.png");

        let cached = cache.image_for_key("http://x/a.png").unwrap();
        assert!(Arc::ptr_eq(&cached, &image));

        cache.remove_image("http://x/a.png");
        assert!(cache.image_for_key("http://x/a.png").is_none());
    }

    #[test]
    fn test_response_cache_decodes_on_lookup() {
        let cache = MemoryResponseCache::default();
        let data = fixtures::animated_gif(&[[255, 0, 0, 255], [0, 255, 0, 255]], 3, 3);

        cache.set_response_data(Bytes::from(data.clone()), metadata(None), request());

        let image = cache.image_for_request(&request().fingerprint()).unwrap();
        assert!(image.is_animated());
        assert_eq!(*image, DecodedImage::decode(&data).unwrap());
    }

    #[test]
    fn test_response_cache_is_keyed_by_headers() {
        let cache = MemoryResponseCache::default();
        let data = fixtures::png([0, 0, 0, 255], 1, 1);

        cache.set_response_data(Bytes::from(data), metadata(None), request());

        let anonymous = Request::builder().set_url("http://x/a.gif").build();
        assert!(cache.image_for_request(&anonymous.fingerprint()).is_none());
    }

    #[test]
    fn test_response_cache_skips_undecodable_bodies() {
        let cache = MemoryResponseCache::default();

        cache.set_response_data(Bytes::from_static(b"not an image"), metadata(None), request());

        let fingerprint = request().fingerprint();
        assert!(cache.cached_response(&fingerprint).is_some());
        assert!(cache.image_for_request(&fingerprint).is_none());
    }

    #[test]
    fn test_revalidation_headers() {
        let cache = MemoryResponseCache::default();

        cache.set_response_data(
            Bytes::from_static(b"GIF89a"),
            metadata(Some("\"abc\"")),
            request(),
        );

        let cached = cache.cached_response(&request().fingerprint()).unwrap();
        assert_eq!(
            cached.revalidation_headers(),
            vec![("If-None-Match".to_string(), "\"abc\"".to_string())]
        );

        cache.remove_all_responses();
        assert!(cache.cached_response(&request().fingerprint()).is_none());
    }
}
