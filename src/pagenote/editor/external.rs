use crate::error::{PagenoteError, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use uuid::Uuid;

/// Gets the editor command from environment.
/// Checks $EDITOR, then $VISUAL, then falls back to common editors.
pub fn get_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    for fallback in &["vim", "vi", "nano"] {
        if Command::new("which")
            .arg(fallback)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return Ok((*fallback).to_string());
        }
    }

    Err(PagenoteError::Editor(
        "No editor found. Set $EDITOR environment variable.".to_string(),
    ))
}

/// Opens a file in `editor` and waits for it to close.
/// Returns the contents of the file after editing.
pub fn open_in_editor<P: AsRef<Path>>(editor: &str, file_path: P) -> Result<String> {
    let path = file_path.as_ref();

    // $EDITOR may carry arguments, e.g. "code --wait".
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PagenoteError::Editor("Editor command is empty".to_string()))?;

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| PagenoteError::Editor(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(PagenoteError::Editor(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    fs::read_to_string(path).map_err(PagenoteError::Io)
}

/// Edits `initial` in the user's editor and returns the saved buffer.
pub fn edit_buffer(initial: &str, file_extension: &str) -> Result<String> {
    let editor = get_editor()?;
    edit_buffer_with(&editor, initial, file_extension)
}

/// Like [`edit_buffer`] with an explicit editor command.
pub fn edit_buffer_with(editor: &str, initial: &str, file_extension: &str) -> Result<String> {
    let temp_file = env::temp_dir().join(format!("pagenote-{}{}", Uuid::new_v4(), file_extension));
    fs::write(&temp_file, initial).map_err(PagenoteError::Io)?;

    let result = open_in_editor(editor, &temp_file);
    let _ = fs::remove_file(&temp_file);
    result
}
