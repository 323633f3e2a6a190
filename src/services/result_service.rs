use crate::error::{AppError, ErrorKind};
use crate::models::result_types::ResultView;
use crate::models::session_types::ResultHandoff;
use crate::services::image_service;
use tracing::warn;

pub const RESULT_NOT_AVAILABLE: &str = "Result not available";
pub const IMAGE_MISSING: &str = "Image is missing!!";

/// Score as a whole percentage, truncated: 0.999 is 99, not 100.
pub fn format_percentage(score: f32) -> u32 {
    if score.is_nan() {
        return 0;
    }
    (score * 100.0).clamp(0.0, 100.0) as u32
}

pub fn result_message(label: Option<&str>, score: Option<f32>) -> String {
    match (label, score) {
        (Some(label), Some(score)) => format!(
            "The result is {} with a confidence score of {}%",
            label,
            format_percentage(score)
        ),
        _ => RESULT_NOT_AVAILABLE.to_string(),
    }
}

pub fn render_result(handoff: &ResultHandoff) -> ResultView {
    let mut notices = Vec::new();

    let image = match handoff.image {
        Some(ref image) => image_service::preview_data_url(image).map_err(|e| {
            warn!(image = %image, "result image could not be shown: {}", e);
            AppError::new(ErrorKind::MissingImage, IMAGE_MISSING)
        }),
        None => Err(AppError::new(ErrorKind::MissingImage, IMAGE_MISSING)),
    };

    let image_data_url = match image {
        Ok(url) => Some(url),
        Err(e) => {
            notices.push(e.message);
            None
        }
    };

    ResultView {
        image_data_url,
        message: result_message(handoff.label.as_deref(), handoff.score),
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session_types::ImageRef;
    use image::{Rgb, RgbImage};

    #[test]
    fn percentage_truncates() {
        assert_eq!(format_percentage(0.0), 0);
        assert_eq!(format_percentage(0.999), 99);
        assert_eq!(format_percentage(1.0), 100);
        assert_eq!(format_percentage(0.5), 50);
        assert_eq!(format_percentage(f32::NAN), 0);
        assert_eq!(format_percentage(1.7), 100);
    }

    #[test]
    fn message_formats_label_and_percentage() {
        assert_eq!(
            result_message(Some("Cancer"), Some(0.876)),
            "The result is Cancer with a confidence score of 87%"
        );
        assert_eq!(result_message(None, Some(0.5)), RESULT_NOT_AVAILABLE);
        assert_eq!(result_message(Some("Cancer"), None), RESULT_NOT_AVAILABLE);
    }

    #[test]
    fn missing_image_shows_notice_and_no_image() {
        let view = render_result(&ResultHandoff {
            label: Some("Non Cancer".to_string()),
            score: Some(0.61),
            image: None,
        });
        assert!(view.image_data_url.is_none());
        assert_eq!(view.notices, vec![IMAGE_MISSING.to_string()]);
        assert_eq!(view.message, "The result is Non Cancer with a confidence score of 61%");
    }

    #[test]
    fn unreadable_image_counts_as_missing() {
        let view = render_result(&ResultHandoff {
            label: None,
            score: None,
            image: Some(ImageRef::new("/no/such/cropped_img.jpg")),
        });
        assert!(view.image_data_url.is_none());
        assert_eq!(view.notices, vec![IMAGE_MISSING.to_string()]);
        assert_eq!(view.message, RESULT_NOT_AVAILABLE);
    }

    #[test]
    fn image_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cropped_img.jpg");
        RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])).save(&path).unwrap();

        let view = render_result(&ResultHandoff {
            label: Some("Cancer".to_string()),
            score: Some(1.0),
            image: Some(ImageRef::from_path(&path)),
        });
        assert!(view.image_data_url.unwrap().starts_with("data:image/jpeg;base64,"));
        assert!(view.notices.is_empty());
        assert!(view.message.ends_with("100%"));
    }
}
