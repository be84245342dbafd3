//! # Image Loading and QR Generation
//!
//! Decodes the `data` attribute of `<image>` widgets (raw base64, no
//! padding), reads intrinsic pixel dimensions for layout, and renders
//! `<qr>` widgets to PNG bytes at parse time. The PDF serializer does its
//! own pixel work; layout only ever needs dimensions.

use std::io::Cursor;

use crate::error::QuireError;

/// Decode a base64 `data` attribute into raw image bytes. Trailing `=`
/// padding is tolerated.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, QuireError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|e| QuireError::Image(format!("failed to decode image data: {}", e)))
}

/// Read the pixel dimensions of an encoded image without decoding pixels.
pub fn intrinsic_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

pub fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// Decoded RGB pixels plus an optional alpha channel, ready for embedding.
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    /// width × height × 3 bytes.
    pub rgb: Vec<u8>,
    /// width × height bytes of grayscale alpha; `None` when fully opaque.
    pub alpha: Option<Vec<u8>>,
}

/// Decode any supported image format to RGB + alpha.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, QuireError> {
    let img = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| QuireError::Image(format!("image format detection failed: {}", e)))?
        .decode()
        .map_err(|e| QuireError::Image(format!("failed to decode image: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(RgbImage {
        width,
        height,
        rgb,
        alpha: if has_transparency { Some(alpha) } else { None },
    })
}

/// Render a QR code as border-free PNG bytes.
///
/// `level` follows the authoring schema: `low`, `medium`, `high` (default),
/// `highest`, giving 7/15/25/30% recovery. `size` is the requested pixel
/// edge;
/// modules are scaled by a whole factor, so the actual edge may be slightly
/// smaller. Layout uses the declared size, not the pixel edge.
pub fn generate_qr_png(code: &str, level: &str, size: u32) -> Result<Vec<u8>, QuireError> {
    use qrcode::{Color as QrColor, EcLevel, QrCode};

    let ec = match level.to_lowercase().as_str() {
        "low" => EcLevel::L,
        "medium" => EcLevel::M,
        "highest" => EcLevel::H,
        _ => EcLevel::Q,
    };

    let qr = QrCode::with_error_correction_level(code.as_bytes(), ec)
        .map_err(|e| QuireError::Image(format!("failed to generate QR code: {:?}", e)))?;

    let modules = qr.width();
    let colors = qr.to_colors();
    let scale = ((size as usize) / modules).max(1);
    let edge = (modules * scale) as u32;

    let mut img = image::GrayImage::from_pixel(edge, edge, image::Luma([255u8]));
    for y in 0..modules {
        for x in 0..modules {
            if colors[y * modules + x] == QrColor::Dark {
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(
                            (x * scale + dx) as u32,
                            (y * scale + dy) as u32,
                            image::Luma([0u8]),
                        );
                    }
                }
            }
        }
    }

    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), edge, edge, image::ColorType::L8)
        .map_err(|e| QuireError::Image(format!("failed to encode QR code as PNG: {}", e)))?;
    Ok(buf)
}
