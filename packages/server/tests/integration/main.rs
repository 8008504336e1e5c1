mod comment;
mod like;
mod video;
