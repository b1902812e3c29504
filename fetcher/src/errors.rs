use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Fetch client middleware error: {0}")]
    ClientMiddlewareError(#[from] reqwest_middleware::Error),
    #[error("Fetch client error: {0}")]
    ClientError(#[from] reqwest::Error),
    #[error("Fetch client failed to create header")]
    InvalidHeader,
    #[error("Request URL is not a valid network location: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Server responded with status {0}")]
    UnexpectedStatus(u16),
}

impl From<InvalidHeaderName> for FetchError {
    fn from(_err: InvalidHeaderName) -> Self {
        Self::InvalidHeader
    }
}

impl From<InvalidHeaderValue> for FetchError {
    fn from(_err: InvalidHeaderValue) -> Self {
        Self::InvalidHeader
    }
}
