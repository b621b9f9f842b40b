use std::io::{self, Write};

use crate::util::clipboard::copy_to_clipboard;

pub const COPIED_SUFFIX: &str = " (copied to clipboard)";

/// Writes the result line, mirroring it to the clipboard when asked.
///
/// A clipboard failure only costs the suffix; the result is still printed.
pub fn emit<W: Write>(out: &mut W, result: &str, copy: bool) -> io::Result<()> {
    let copied = copy && copy_result(result);
    write_result(out, result, copied)
}

pub fn write_result<W: Write>(out: &mut W, result: &str, copied: bool) -> io::Result<()> {
    if copied {
        writeln!(out, "{}{}", result, COPIED_SUFFIX)
    } else {
        writeln!(out, "{}", result)
    }
}

fn copy_result(result: &str) -> bool {
    match copy_to_clipboard(result) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not copy to clipboard: {:#}", e);
            false
        }
    }
}
