//! Encoded image payloads for tests in this and downstream crates.

use std::io::Cursor;

use image::{
    Delay, Frame, ImageFormat, Rgba, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
};

const FRAME_DELAY_MS: u32 = 100;

/// Two-frame 3x2 APNG, red then blue, 100ms per frame, looping forever.
pub const ANIMATED_PNG: &[u8] = include_bytes!("../testdata/animated.png");

/// Two-frame 3x2 lossless animated WebP, green then white, 100ms per frame.
pub const ANIMATED_WEBP: &[u8] = include_bytes!("../testdata/animated.webp");

/// Encodes a looping GIF with one solid-colour frame per entry in `colors`.
pub fn animated_gif(colors: &[[u8; 4]], width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();

    {
        let mut encoder = GifEncoder::new(&mut data);
        encoder
            .set_repeat(Repeat::Infinite)
            .expect("repeat flag to be written");

        let frames = colors.iter().map(|color| {
            Frame::from_parts(
                RgbaImage::from_pixel(width, height, Rgba(*color)),
                0,
                0,
                Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1),
            )
        });

        encoder.encode_frames(frames).expect("frames to be encoded");
    }

    data
}

pub fn png(color: [u8; 4], width: u32, height: u32) -> Vec<u8> {
    let mut data = Cursor::new(Vec::new());

    RgbaImage::from_pixel(width, height, Rgba(color))
        .write_to(&mut data, ImageFormat::Png)
        .expect("png to be encoded");

    data.into_inner()
}
