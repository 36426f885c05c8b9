//! Music library: track references, albums and the folder scanner.

mod model;
mod scan;

pub use model::{Album, Track, file_url};
pub use scan::scan_library;
