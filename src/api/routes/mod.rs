pub mod analysis;
pub mod audio;
pub mod documents;
pub mod logs;
