//! QR code rendering for share links

use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

pub const DEFAULT_SIZE: u32 = 256;
pub const MAX_SIZE: u32 = 1024;

/// Requested edge length in pixels; bad or non-positive values fall back to the default
pub fn clamp_size(requested: Option<&str>) -> u32 {
    requested
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map_or(DEFAULT_SIZE, |n| u32::try_from(n.min(i64::from(MAX_SIZE))).unwrap_or(MAX_SIZE))
}

/// Encode `data` with medium error correction as a grayscale PNG of about `size` x `size`
pub fn encode_png(data: &str, size: u32) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .context("data does not fit in a QR code")?;

    let rendered = code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .max_dimensions(size, size)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(rendered)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("encoding QR code as PNG")?;
    Ok(png)
}
