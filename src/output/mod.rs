pub mod json;

pub use json::{to_string_pretty, to_writer_pretty, write_file};
