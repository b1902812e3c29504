use std::sync::Arc;

use bytes::Bytes;
use common::decoded_image::DecodedImage;
use fetcher::{
    request::{Request, RequestFingerprint},
    traits::ResponseMetadata,
};

/// Stores decoded images under a plain string key, usually the image URL.
pub trait ImageCache: Send + Sync {
    fn image_for_key(&self, key: &str) -> Option<Arc<DecodedImage>>;
    fn set_image(&self, image: Arc<DecodedImage>, key: &str);
    fn remove_image(&self, key: &str);
    fn remove_all_images(&self);
}

/// Stores raw responses keyed by the fingerprint of the request that
/// produced them, and hands back decoded images on lookup.
pub trait RequestResponseCache: Send + Sync {
    fn image_for_request(&self, fingerprint: &RequestFingerprint) -> Option<Arc<DecodedImage>>;
    fn cached_response(&self, fingerprint: &RequestFingerprint) -> Option<Arc<CachedResponse>>;
    fn set_response_data(&self, data: Bytes, response: ResponseMetadata, request: Request);
    fn remove_response(&self, fingerprint: &RequestFingerprint);
    fn remove_all_responses(&self);
}

#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub data: Bytes,
    pub response: ResponseMetadata,
    pub request: Request,
}

impl CachedResponse {
    /// Conditional request headers that let the origin answer 304 for this
    /// entry.
    pub fn revalidation_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        if let Some(etag) = self.response.etag() {
            headers.push(("If-None-Match".to_string(), etag.to_string()));
        }

        if let Some(last_modified) = self.response.last_modified() {
            headers.push(("If-Modified-Since".to_string(), last_modified.to_string()));
        }

        headers
    }
}
