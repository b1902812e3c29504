pub mod client;
pub mod config;
pub mod errors;
pub mod request;
pub mod traits;

pub use reqwest;
