use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::util::fs::path_exists;

/// Length of a clip code.
pub const CODE_LEN: usize = 5;

/// What the single command line argument turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Url(String),
    Code(String),
    Unrecognized(String),
}

/// Classifies `arg`, first match wins: existing path, then URL, then code.
///
/// Paths are checked on the raw OS string; only UTF-8 arguments can be a
/// URL or a code.
pub fn classify(arg: &OsStr) -> Input {
    if path_exists(Path::new(arg)) {
        return Input::File(PathBuf::from(arg));
    }

    match arg.to_str() {
        Some(s) if is_url(s) => Input::Url(s.to_string()),
        Some(s) if is_clip_code(s) => Input::Code(s.to_string()),
        _ => Input::Unrecognized(arg.to_string_lossy().into_owned()),
    }
}

/// Absolute URL with both a scheme and a non-empty host.
pub fn is_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Exactly five ASCII letters or digits, any case.
pub fn is_clip_code(s: &str) -> bool {
    s.len() == CODE_LEN && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
