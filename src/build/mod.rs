pub mod builder;
pub mod walker;

pub use builder::{add_file, build, ParallelIndexBuilder};
pub use walker::find_text_files;
