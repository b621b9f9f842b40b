use anyhow::{Context, Result};

/// Copies `text` to the system clipboard.
///
/// Headless sessions usually have no clipboard, so callers treat a failure
/// as a warning rather than aborting.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_owned())
        .context("failed to write to clipboard")?;
    Ok(())
}
