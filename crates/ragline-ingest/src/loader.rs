//! Document loading
//!
//! Documents are local plain-text files read as UTF-8. The path becomes
//! the source identifier carried through chunk metadata.

use ragline_core::{Document, RaglineError, Result};
use std::path::Path;

/// Load a UTF-8 text file as a document
pub fn load_text_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        RaglineError::DocumentError(format!("Failed to read {}: {e}", path.display()))
    })?;

    Ok(Document::new(path.display().to_string(), content))
}
