pub mod coordinator;
pub mod range;
pub mod streaming;
