pub mod clipboard;
pub mod format;
pub mod fs;
pub mod logging;
pub mod mime;
