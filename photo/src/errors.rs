use fetcher::errors::FetchError;
use thiserror::Error;
use tokio::runtime::TryCurrentError;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Photo loading needs a tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
    #[error("Failed to create fetcher")]
    FetcherInitFailed(#[from] FetchError),
}
