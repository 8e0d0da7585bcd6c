mod common;
mod typescript;

pub use typescript::{Dialect, ExtractError, Extraction, TypeScriptExtractor, ANONYMOUS_CLASS};
