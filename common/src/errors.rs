use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Received an empty payload")]
    EmptyPayload,
    #[error("Failed to decode image data: {0}")]
    InvalidImage(#[from] image::ImageError),
    #[error("Decoded animation did not contain any frames")]
    NoFrames,
}
