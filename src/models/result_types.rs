use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultView {
    /// `data:image/jpeg;base64,...`, absent when the image could not be shown.
    pub image_data_url: Option<String>,
    pub message: String,
    pub notices: Vec<String>,
}
