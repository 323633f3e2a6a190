use crate::error::AppError;
use crate::models::session_types::ImageRef;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::io::{Cursor, Read};
use std::path::Path;

// EXIF lives in the first segment of the file; 128KB covers it comfortably.
const EXIF_PROBE_BYTES: u64 = 128 * 1024;
const PREVIEW_SIZE: u32 = 1920;
const PREVIEW_QUALITY: u8 = 85;

/// Decode the image behind `image` with its EXIF orientation applied, so
/// what gets cropped and classified is what the user saw in the picker.
pub fn load_oriented(image: &ImageRef) -> Result<DynamicImage, AppError> {
    let path = image.to_path();
    if !path.exists() {
        return Err(AppError::decode(format!("Image not found: {}", path.display())));
    }

    let img = ImageReader::open(&path)
        .map_err(|e| AppError::decode(format!("Failed to open image {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| AppError::decode(format!("Failed to read image {}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| AppError::decode(format!("Failed to decode image {}: {}", path.display(), e)))?;

    Ok(apply_orientation(img, read_orientation(&path)))
}

/// EXIF orientation tag (1..=8), `1` when absent or unreadable.
pub fn read_orientation(path: &Path) -> u32 {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return 1,
    };

    let mut header = Vec::with_capacity(EXIF_PROBE_BYTES as usize);
    if file.take(EXIF_PROBE_BYTES).read_to_end(&mut header).is_err() {
        return 1;
    }

    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(&header)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| match field.value {
            exif::Value::Short(ref v) => v.first().map(|&o| o as u32),
            exif::Value::Long(ref v) => v.first().copied(),
            _ => None,
        })
        .unwrap_or(1)
}

pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}

pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, AppError> {
    let mut buffer = Cursor::new(Vec::new());
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AppError::decode(format!("Failed to encode JPEG: {}", e)))?;
    Ok(buffer.into_inner())
}

/// Screen-sized JPEG preview as a data URI for the webview.
pub fn preview_data_url(image: &ImageRef) -> Result<String, AppError> {
    let mut img = load_oriented(image)?;
    if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
        img = img.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE);
    }
    let bytes = encode_jpeg(&img, PREVIEW_QUALITY)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:image/jpeg;base64,{}", b64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::{Rgb, RgbImage};

    #[test]
    fn orientation_defaults_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::new(4, 2).save(&path).unwrap();
        assert_eq!(read_orientation(&path), 1);
        assert_eq!(read_orientation(&dir.path().join("missing.jpg")), 1);
    }

    #[test]
    fn rotate_orientation_swaps_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 2));
        let rotated = apply_orientation(img.clone(), 6);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
        let same = apply_orientation(img, 1);
        assert_eq!((same.width(), same.height()), (4, 2));
    }

    #[test]
    fn load_missing_image_is_decode_error() {
        let err = load_oriented(&ImageRef::new("/definitely/not/here.png")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
    }

    #[test]
    fn preview_is_jpeg_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(8, 8, Rgb([255, 0, 0])).save(&path).unwrap();

        let url = preview_data_url(&ImageRef::from_path(&path)).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}
