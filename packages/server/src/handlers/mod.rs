pub mod comment;
pub mod health;
pub mod like;
pub mod stream;
pub mod video;
