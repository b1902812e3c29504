pub mod content_mode;
pub mod decoded_image;
pub mod errors;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
