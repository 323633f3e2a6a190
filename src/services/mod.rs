pub mod classifier;
pub mod crop_service;
pub mod image_service;
pub mod picker_service;
pub mod result_service;
pub mod session;
