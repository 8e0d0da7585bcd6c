mod file_finder;

pub use file_finder::{is_supported_file, FileFinder, FileStats, FileType};
