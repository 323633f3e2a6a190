pub mod classify_types;
pub mod result_types;
pub mod session_types;
