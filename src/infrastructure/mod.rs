pub mod audio;
pub mod storage;
