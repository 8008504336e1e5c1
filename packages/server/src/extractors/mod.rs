pub mod json;
pub mod viewer;
