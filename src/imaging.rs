use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, ImageResult, Limits};
use std::io::Cursor;

use crate::config::{JPEG_QUALITY, MAX_DECODE_ALLOC, MAX_DECODE_DIMENSION, MAX_DIMENSION};

const CAPACITY: usize = 256 * 1024;

/// Re-encoded image ready to be written to the uploads directory.
#[derive(Debug)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decodes `data`, shrinks it to fit inside the bounding box keeping its
/// aspect ratio, and re-encodes it as JPEG. Images already inside the box
/// keep their dimensions.
///
/// Decoding is bounded by [`decode_limits`]; an image over them fails with
/// `ImageError::Limits` before its pixels are allocated.
pub fn normalize(data: &[u8]) -> ImageResult<NormalizedImage> {
    normalize_with_limits(data, decode_limits())
}

pub fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODE_DIMENSION);
    limits.max_image_height = Some(MAX_DECODE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

fn normalize_with_limits(data: &[u8], limits: Limits) -> ImageResult<NormalizedImage> {
    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    reader.limits(limits);
    let decoded = reader.decode()?;
    let bounded = fit_inside(decoded, MAX_DIMENSION);
    let (width, height) = bounded.dimensions();
    let bytes = encode_jpeg(&bounded, JPEG_QUALITY)?;

    Ok(NormalizedImage {
        bytes,
        width,
        height,
    })
}

fn fit_inside(img: DynamicImage, max: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= max && h <= max {
        return img;
    }
    img.resize(max, max, FilterType::CatmullRom)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> ImageResult<Vec<u8>> {
    // JPEG has no alpha channel and only 8-bit samples.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut bytes = Vec::with_capacity(CAPACITY);
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(bytes)
}
