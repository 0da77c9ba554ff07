pub mod audio;
pub mod jobs;
