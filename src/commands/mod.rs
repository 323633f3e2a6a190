pub mod classifier;
pub mod crop;
pub mod picker;
pub mod result;
pub mod session;
