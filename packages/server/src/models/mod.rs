pub mod comment;
pub mod like;
pub mod shared;
pub mod video;
