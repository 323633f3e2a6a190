use crate::config::{ClassifierConfig, TensorLayout};
use crate::error::AppError;
use crate::models::session_types::ImageRef;
use crate::services::image_service;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Decode `image` and turn it into the model's input tensor.
pub fn prepare(image: &ImageRef, config: &ClassifierConfig) -> Result<Array4<f32>, AppError> {
    let img = image_service::load_oriented(image)?;
    to_tensor(&img, config.input_size, config.layout)
}

/// Nearest-neighbour resample to `size`x`size` and cast channels to f32.
/// Values stay in 0..=255; the model does its own normalisation.
pub fn to_tensor(img: &DynamicImage, size: u32, layout: TensorLayout) -> Result<Array4<f32>, AppError> {
    let rgb = img.resize_exact(size, size, FilterType::Nearest).to_rgb8();
    let raw = rgb.into_raw();
    let side = size as usize;

    let (shape, data) = match layout {
        TensorLayout::Nhwc => {
            let data: Vec<f32> = raw.iter().map(|&v| v as f32).collect();
            ((1, side, side, 3), data)
        }
        TensorLayout::Nchw => {
            // Planar: all R, then all G, then all B.
            let hw = side * side;
            let mut data = vec![0f32; 3 * hw];
            for (i, pixel) in raw.chunks_exact(3).enumerate() {
                data[i] = pixel[0] as f32;
                data[hw + i] = pixel[1] as f32;
                data[2 * hw + i] = pixel[2] as f32;
            }
            ((1, 3, side, side), data)
        }
    };

    Array4::from_shape_vec(shape, data)
        .map_err(|e| AppError::decode(format!("Failed to create tensor: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn quadrants() -> DynamicImage {
        // 2x2: red, green / blue, white
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));
        img.put_pixel(1, 1, Rgb([255, 255, 255]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn nhwc_tensor_has_model_shape_and_raw_values() {
        let tensor = to_tensor(&quadrants(), 4, TensorLayout::Nhwc).unwrap();
        assert_eq!(tensor.shape(), &[1, 4, 4, 3]);
        // Nearest neighbour keeps hard edges: top-left block is pure red.
        assert_eq!(tensor[[0, 0, 0, 0]], 255.0);
        assert_eq!(tensor[[0, 1, 1, 1]], 0.0);
        assert_eq!(tensor[[0, 3, 3, 2]], 255.0);
        assert_eq!(tensor[[0, 0, 3, 1]], 255.0);
    }

    #[test]
    fn nchw_tensor_is_planar() {
        let tensor = to_tensor(&quadrants(), 2, TensorLayout::Nchw).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 0]], 255.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 255.0);
        assert_eq!(tensor[[0, 2, 1, 0]], 255.0);
        assert_eq!(tensor[[0, 2, 0, 0]], 0.0);
    }

    #[test]
    fn non_square_input_is_stretched_to_square() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 120, Rgb([10, 20, 30])));
        let tensor = to_tensor(&img, 224, TensorLayout::Nhwc).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert_eq!(tensor[[0, 100, 200, 2]], 30.0);
    }

    #[test]
    fn prepare_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesion.png");
        RgbImage::from_pixel(50, 40, Rgb([1, 2, 3])).save(&path).unwrap();

        let config = ClassifierConfig::default();
        let tensor = prepare(&ImageRef::from_path(&path), &config).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert_eq!(tensor[[0, 0, 0, 1]], 2.0);
    }
}
