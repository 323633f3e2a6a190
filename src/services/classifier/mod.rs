pub mod engine;
pub mod helper;
pub mod postprocess;
pub mod preprocess;
