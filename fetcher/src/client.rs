use std::str::FromStr;

use async_trait::async_trait;
use reqwest::{
    ClientBuilder as BaseClientBuilder,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use reqwest_middleware::{ClientBuilder as RetryableClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info};
use url::Url;

use crate::{
    config::SessionConfig,
    errors::FetchError,
    request::Request,
    traits::{FetchResponse, Fetcher, ResponseMetadata},
};

/// reqwest backed [`Fetcher`]. The client and its connection pool are shared
/// by every request made through one instance.
#[derive(Clone)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(config: &SessionConfig) -> Result<Self, FetchError> {
        let base_client = BaseClientBuilder::new()
            .gzip(true)
            .http1_ignore_invalid_headers_in_responses(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .https_only(config.https_only)
            .build()?;

        let retry_strat = ExponentialBackoff::builder()
            .retry_bounds(config.min_backoff, config.max_backoff)
            .build_with_max_retries(config.max_retries);
        let retry_middleware = RetryTransientMiddleware::new_with_policy(retry_strat);

        let client = RetryableClientBuilder::new(base_client)
            .with(retry_middleware)
            .build();

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, FetchError> {
        let url = Url::parse(&request.url)?;

        let mut request_builder = self.client.get(url.clone());

        if !request.headers.is_empty() {
            let mut header_map = HeaderMap::new();

            for (key, value) in request.headers.iter() {
                header_map.insert(HeaderName::from_str(key)?, HeaderValue::from_str(value)?);
            }

            request_builder = request_builder.headers(header_map);
        }

        info!("Sending request to {}", url);

        let response = request_builder.send().await?;

        debug!("{response:?}");

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let metadata = ResponseMetadata {
            status: status.as_u16(),
            url: response.url().to_string(),
            headers: response.headers().clone(),
        };

        let raw_bytes = response.bytes().await?;

        Ok(FetchResponse {
            metadata,
            raw_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&SessionConfig::default().without_retries()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_metadata() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/a.gif"))
            .and(header("authorization", "t"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("etag", "\"v1\"")
                    .insert_header("content-type", "image/gif")
                    .set_body_bytes(b"GIF89a".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = Request::builder()
            .set_url(format!("{}/a.gif", server.uri()))
            .set_header("Authorization", "t")
            .build();

        let response = fetcher().fetch(&request).await.unwrap();

        assert_eq!(response.raw_bytes.as_ref(), b"GIF89a");
        assert_eq!(response.metadata.status, 200);
        assert_eq!(response.metadata.etag(), Some("\"v1\""));
        assert_eq!(response.metadata.content_type(), Some("image/gif"));
        assert!(response.metadata.url.ends_with("/a.gif"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = Request::builder()
            .set_url(format!("{}/missing.png", server.uri()))
            .build();

        let result = fetcher().fetch(&request).await;

        assert!(matches!(result, Err(FetchError::UnexpectedStatus(404))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_url() {
        let request = Request::builder().set_url("not a url").build();

        let result = fetcher().fetch(&request).await;

        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_header() {
        let request = Request::builder()
            .set_url("http://localhost/a.gif")
            .set_header("bad header", "t")
            .build();

        let result = fetcher().fetch(&request).await;

        assert!(matches!(result, Err(FetchError::InvalidHeader)));
    }

    #[tokio::test]
    async fn test_https_only_refuses_plain_http() {
        let server = MockServer::start().await;

        let config = SessionConfig {
            https_only: true,
            ..SessionConfig::default().without_retries()
        };

        let request = Request::builder()
            .set_url(format!("{}/a.gif", server.uri()))
            .build();

        let result = HttpFetcher::new(&config).unwrap().fetch(&request).await;

        assert!(result.is_err());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
