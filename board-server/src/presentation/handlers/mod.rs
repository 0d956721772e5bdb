pub mod board;
pub mod media;
