pub mod grade;
pub mod audio_file;

pub use grade::*;
pub use audio_file::*;
