use std::{io::Cursor, time::Duration};

use image::{
    AnimationDecoder, DynamicImage, ImageFormat, RgbaImage,
    codecs::{gif::GifDecoder, png::PngDecoder, webp::WebPDecoder},
};
use tracing::trace;

use crate::errors::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub buffer: RgbaImage,
    pub delay: Duration,
}

impl ImageFrame {
    fn still(buffer: RgbaImage) -> Self {
        Self {
            buffer,
            delay: Duration::ZERO,
        }
    }
}

/// Fully decoded pixels for a photo. Animated sources keep every frame,
/// still images are a single frame with no delay.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    format: ImageFormat,
    frames: Vec<ImageFrame>,
}

impl DecodedImage {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }

        let format = image::guess_format(data)?;

        let frames = match format {
            ImageFormat::Gif => Self::collect_frames(GifDecoder::new(Cursor::new(data))?)?,
            ImageFormat::Png => {
                let decoder = PngDecoder::new(Cursor::new(data))?;

                if decoder.is_apng()? {
                    Self::collect_frames(decoder.apng()?)?
                } else {
                    vec![ImageFrame::still(
                        DynamicImage::from_decoder(decoder)?.into_rgba8(),
                    )]
                }
            }
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(Cursor::new(data))?;

                if decoder.has_animation() {
                    Self::collect_frames(decoder)?
                } else {
                    vec![ImageFrame::still(
                        DynamicImage::from_decoder(decoder)?.into_rgba8(),
                    )]
                }
            }
            other => vec![ImageFrame::still(
                image::load_from_memory_with_format(data, other)?.into_rgba8(),
            )],
        };

        if frames.is_empty() {
            return Err(DecodeError::NoFrames);
        }

        trace!("Decoded {:?} image with {} frame(s)", format, frames.len());

        Ok(Self { format, frames })
    }

    fn collect_frames<'a>(
        decoder: impl AnimationDecoder<'a>,
    ) -> Result<Vec<ImageFrame>, DecodeError> {
        let frames = decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| ImageFrame {
                delay: Duration::from(frame.delay()),
                buffer: frame.into_buffer(),
            })
            .collect();

        Ok(frames)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn frames(&self) -> &[ImageFrame] {
        &self.frames
    }

    // decode() never builds an empty frame list
    pub fn first_frame(&self) -> &ImageFrame {
        &self.frames[0]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn width(&self) -> u32 {
        self.first_frame().buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.first_frame().buffer.height()
    }

    /// Time for one full loop of the animation, zero for still images.
    pub fn duration(&self) -> Duration {
        self.frames.iter().map(|frame| frame.delay).sum()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::fixtures;

    #[test]
    fn test_decode_animated_gif() {
        let data = fixtures::animated_gif(&[[255, 0, 0, 255], [0, 0, 255, 255]], 4, 3);
        let image = DecodedImage::decode(&data).unwrap();

        assert_eq!(image.format(), ImageFormat::Gif);
        assert!(image.is_animated());
        assert_eq!(image.frame_count(), 2);
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_decode_apng_keeps_every_frame() {
        let image = DecodedImage::decode(fixtures::ANIMATED_PNG).unwrap();

        assert_eq!(image.format(), ImageFormat::Png);
        assert!(image.is_animated());
        assert_eq!(image.frame_count(), 2);
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.duration(), Duration::from_millis(200));
        assert_eq!(
            *image.frames()[0].buffer.get_pixel(0, 0),
            Rgba([255, 0, 0, 255])
        );
        assert_eq!(
            *image.frames()[1].buffer.get_pixel(2, 1),
            Rgba([0, 0, 255, 255])
        );
    }

    #[test]
    fn test_decode_animated_webp_keeps_every_frame() {
        let image = DecodedImage::decode(fixtures::ANIMATED_WEBP).unwrap();

        assert_eq!(image.format(), ImageFormat::WebP);
        assert!(image.is_animated());
        assert_eq!(image.frame_count(), 2);
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.duration(), Duration::from_millis(200));
        assert_eq!(
            *image.frames()[0].buffer.get_pixel(0, 0),
            Rgba([0, 255, 0, 255])
        );
    }

    #[test]
    fn test_decode_single_frame_gif_is_still() {
        let data = fixtures::animated_gif(&[[0, 255, 0, 255]], 2, 2);
        let image = DecodedImage::decode(&data).unwrap();

        assert!(!image.is_animated());
        assert_eq!(image.frame_count(), 1);
    }

    #[test]
    fn test_decode_png() {
        let data = fixtures::png([10, 20, 30, 255], 5, 7);
        let image = DecodedImage::decode(&data).unwrap();

        assert_eq!(image.format(), ImageFormat::Png);
        assert!(!image.is_animated());
        assert_eq!((image.width(), image.height()), (5, 7));
        assert_eq!(image.duration(), Duration::ZERO);
        assert_eq!(
            *image.first_frame().buffer.get_pixel(0, 0),
            Rgba([10, 20, 30, 255])
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let data = fixtures::animated_gif(&[[1, 2, 3, 255], [4, 5, 6, 255]], 3, 3);

        assert_eq!(
            DecodedImage::decode(&data).unwrap(),
            DecodedImage::decode(&data).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = DecodedImage::decode(b"<html>not found</html>");
        assert!(matches!(result, Err(DecodeError::InvalidImage(_))));
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        assert!(matches!(
            DecodedImage::decode(&[]),
            Err(DecodeError::EmptyPayload)
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_gif() {
        let data = fixtures::animated_gif(&[[255, 0, 0, 255], [0, 0, 255, 255]], 4, 4);
        assert!(DecodedImage::decode(&data[..16]).is_err());
    }
}
