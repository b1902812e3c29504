use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, ETAG, HeaderMap, HeaderName, LAST_MODIFIED};

use crate::{errors::FetchError, request::Request};

/// Everything about a response except its body.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    pub status: u16,
    pub url: String,
    pub headers: HeaderMap,
}

impl ResponseMetadata {
    fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn etag(&self) -> Option<&str> {
        self.header(ETAG)
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.header(LAST_MODIFIED)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }
}

pub struct FetchResponse {
    pub metadata: ResponseMetadata,
    pub raw_bytes: Bytes,
}

/// Something that can turn a [`Request`] into response bytes. The HTTP
/// implementation lives in [`crate::client`], tests script their own.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, FetchError>;
}
