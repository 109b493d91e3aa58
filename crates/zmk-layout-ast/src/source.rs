//! Source text tracking for error reporting.
//!
//! Provides a minimal source-file structure with a line index, supporting
//! line/column lookup and the short context snippets attached to
//! diagnostics.

use serde::{Deserialize, Serialize};

/// A single source text with line indexing.
///
/// Positions throughout the pipeline are 1-based lines and columns; the
/// line-start table makes offset-to-position lookup and snippet extraction
/// cheap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Original source text.
    source: String,
    /// Byte offsets of each line start.
    ///
    /// line_starts[0] is always 0 (start of file).
    /// The last element is an EOF sentinel, so the number of lines is
    /// `line_starts.len() - 1`.
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Create a new source file with a precomputed line index.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = compute_line_starts(&source);
        Self {
            source,
            line_starts,
        }
    }

    /// The underlying source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get (line, column) for a byte offset. Both are 1-based.
    ///
    /// Offsets past EOF clamp to the final position.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);

        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx.min(self.line_count().saturating_sub(1)),
            Err(idx) => idx.max(1) - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;
        (line, col)
    }

    /// Get the text of a specific line (1-based), without its newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[(line - 1) as usize] as usize;
        let end = self.line_starts[line as usize] as usize;
        Some(self.source[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Build a context snippet for an error position.
    ///
    /// The snippet is a window of at most three source lines centered on
    /// `line`, with a caret marking `column` under the offending line.
    pub fn context_snippet(&self, line: u32, column: u32) -> String {
        let mut out = String::new();
        if line > 1 {
            if let Some(text) = self.line_text(line - 1) {
                out.push_str(text);
                out.push('\n');
            }
        }
        if let Some(text) = self.line_text(line) {
            out.push_str(text);
            out.push('\n');
            let caret_col = column.max(1) as usize - 1;
            for _ in 0..caret_col {
                out.push(' ');
            }
            out.push('^');
        }
        if let Some(text) = self.line_text(line + 1) {
            out.push('\n');
            out.push_str(text);
        }
        out
    }
}

/// Compute byte offsets of line starts in source text.
///
/// The returned table always carries an EOF sentinel as its final element
/// so the last line's range can be computed.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    // always terminate with the EOF sentinel, including for empty input
    if line_starts.len() == 1 || line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}
