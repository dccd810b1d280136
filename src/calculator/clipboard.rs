//! Clipboard functionality for copying calculator results.

use super::engine::Readout;
use crate::error::ClipboardError;
use arboard::Clipboard;

/// Copy text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;

    clipboard
        .set_text(text.to_string())
        .map_err(ClipboardError::Copy)
}

/// Copy the displayed numeral. Error readouts have nothing to copy.
pub fn copy_readout(readout: &Readout) -> Result<(), ClipboardError> {
    if readout.is_error() {
        return Err(ClipboardError::NothingToCopy);
    }
    copy_to_clipboard(&readout.display)
}
