use crate::config::CropOptions;
use crate::error::AppError;
use crate::models::session_types::{CropRegion, ImageRef};
use crate::services::image_service;
use image::imageops::FilterType;
use std::path::Path;
use tracing::{debug, warn};

/// Crop `source` to the configured aspect ratio, shrink it to the configured
/// bounds and write it as JPEG into `out_dir`. Returns the cropped image.
pub fn crop_image(
    source: &ImageRef,
    region: Option<CropRegion>,
    options: &CropOptions,
    out_dir: &Path,
) -> Result<ImageRef, AppError> {
    let result = do_crop(source, region, options, out_dir);
    if let Err(ref e) = result {
        warn!(source = %source, "crop failed: {}", e);
    }
    result
}

fn do_crop(
    source: &ImageRef,
    region: Option<CropRegion>,
    options: &CropOptions,
    out_dir: &Path,
) -> Result<ImageRef, AppError> {
    let img = image_service::load_oriented(source)
        .map_err(|e| AppError::crop(format!("Failed to load image for cropping: {}", e.message)))?;

    let rect = fit_region(img.width(), img.height(), region, options.aspect_ratio)?;
    let mut cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);

    if cropped.width() > options.max_width || cropped.height() > options.max_height {
        cropped = cropped.resize(options.max_width, options.max_height, FilterType::Lanczos3);
    }

    let bytes = image_service::encode_jpeg(&cropped, options.quality)
        .map_err(|e| AppError::crop(e.message))?;

    std::fs::create_dir_all(out_dir).map_err(|e| {
        AppError::crop(format!("Failed to create {}: {}", out_dir.display(), e))
    })?;
    let dest = out_dir.join(&options.output_name);
    std::fs::write(&dest, &bytes)
        .map_err(|e| AppError::crop(format!("Failed to write {}: {}", dest.display(), e)))?;

    debug!(
        source = %source,
        dest = %dest.display(),
        width = cropped.width(),
        height = cropped.height(),
        "cropped image"
    );

    Ok(ImageRef::from_path(dest))
}

/// Largest rectangle with the given aspect ratio inside `region` (or the
/// whole image), centred on it.
pub fn fit_region(
    width: u32,
    height: u32,
    region: Option<CropRegion>,
    aspect: (u32, u32),
) -> Result<CropRegion, AppError> {
    let bounds = match region {
        None => CropRegion {
            x: 0,
            y: 0,
            width,
            height,
        },
        Some(r) => {
            if r.x >= width || r.y >= height {
                return Err(AppError::crop(format!(
                    "Crop region starts outside the {}x{} image",
                    width, height
                )));
            }
            CropRegion {
                x: r.x,
                y: r.y,
                width: r.width.min(width - r.x),
                height: r.height.min(height - r.y),
            }
        }
    };

    let (ax, ay) = (aspect.0 as u64, aspect.1 as u64);
    let (bw, bh) = (bounds.width as u64, bounds.height as u64);
    let w = bw.min(bh * ax / ay);
    let h = w * ay / ax;
    if w == 0 || h == 0 {
        return Err(AppError::crop("Crop region is empty"));
    }

    Ok(CropRegion {
        x: bounds.x + ((bw - w) / 2) as u32,
        y: bounds.y + ((bh - h) / 2) as u32,
        width: w as u32,
        height: h as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::{Rgb, RgbImage};

    fn source(dir: &Path, w: u32, h: u32) -> ImageRef {
        let path = dir.join("source.png");
        RgbImage::from_pixel(w, h, Rgb([200, 100, 50])).save(&path).unwrap();
        ImageRef::from_path(path)
    }

    #[test]
    fn centred_square_without_region() {
        let rect = fit_region(300, 200, None, (1, 1)).unwrap();
        assert_eq!(rect, CropRegion { x: 50, y: 0, width: 200, height: 200 });
    }

    #[test]
    fn region_is_clamped_and_squared() {
        let region = CropRegion { x: 100, y: 20, width: 500, height: 100 };
        let rect = fit_region(300, 200, Some(region), (1, 1)).unwrap();
        // Clamped to 200x100, squared to 100x100, centred horizontally.
        assert_eq!(rect, CropRegion { x: 150, y: 20, width: 100, height: 100 });
    }

    #[test]
    fn region_outside_image_is_rejected() {
        let region = CropRegion { x: 400, y: 0, width: 10, height: 10 };
        let err = fit_region(300, 200, Some(region), (1, 1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CropFailed);

        let empty = CropRegion { x: 0, y: 0, width: 0, height: 10 };
        assert!(fit_region(300, 200, Some(empty), (1, 1)).is_err());
    }

    #[test]
    fn output_is_square_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), 2400, 1600);
        let out_dir = dir.path().join("cache");

        let cropped = crop_image(&src, None, &CropOptions::default(), &out_dir).unwrap();
        assert_eq!(cropped.to_path(), out_dir.join("cropped_img.jpg"));

        let (w, h) = image::image_dimensions(cropped.to_path()).unwrap();
        assert_eq!((w, h), (1000, 1000));
    }

    #[test]
    fn small_crops_are_not_enlarged() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), 120, 80);
        let cropped = crop_image(&src, None, &CropOptions::default(), dir.path()).unwrap();
        assert_eq!(image::image_dimensions(cropped.to_path()).unwrap(), (80, 80));
    }

    #[test]
    fn unreadable_source_is_crop_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = crop_image(
            &ImageRef::from_path(dir.path().join("missing.png")),
            None,
            &CropOptions::default(),
            dir.path(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CropFailed);
    }
}
