//! Document text access and edit application.
//!
//! The engine reads the document through the [`Document`] trait and produces
//! [`TextEdit`]s in ascending, non-overlapping order. [`TextDocument`] is the
//! in-memory implementation used by callers without an editor buffer.

use crate::TextRange;

/// Error applying a batch of edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// An edit starts before the previous edit ends.
    #[error("edit at {next} overlaps or precedes edit at {prev}")]
    Unordered { prev: TextRange, next: TextRange },
    /// An edit range extends past the end of the text.
    #[error("edit at {range} is outside the document (length {len})")]
    OutOfBounds { range: TextRange, len: u32 },
    /// An edit range splits a multi-byte character.
    #[error("edit at {range} does not fall on character boundaries")]
    NotCharBoundary { range: TextRange },
}

/// Replacement of a document range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextEdit {
    /// Range in the document the edits were computed against.
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        TextEdit {
            range,
            replacement: replacement.into(),
        }
    }

    /// Change in document length caused by this edit.
    pub fn delta(&self) -> i64 {
        self.replacement.len() as i64 - i64::from(self.range.len())
    }
}

/// Read access to the text being formatted.
///
/// Lines are 0-based; offsets are byte offsets.
pub trait Document {
    fn text(&self) -> &str;

    /// Line containing `offset`. An offset at a line start belongs to that line.
    fn line_number(&self, offset: u32) -> usize;

    /// Offset of the first byte of `line`.
    fn line_start_offset(&self, line: usize) -> u32;

    /// Offset of the line terminator (or document end) of `line`.
    fn line_end_offset(&self, line: usize) -> u32;

    fn line_count(&self) -> usize;

    fn text_len(&self) -> u32 {
        u32::try_from(self.text().len()).unwrap_or(u32::MAX)
    }
}

/// In-memory document with a precomputed line start table.
#[derive(Clone, Debug, Default)]
pub struct TextDocument {
    text: String,
    /// Byte offset of each line start; `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        TextDocument { text, line_starts }
    }

    /// Apply edits computed against the current text.
    ///
    /// Edits must be sorted and non-overlapping; each later edit is shifted
    /// by the length change accumulated from the earlier ones. On error the
    /// document is left untouched.
    pub fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), EditError> {
        let text = apply_edits(&self.text, edits)?;
        self.line_starts = line_starts(&text);
        self.text = text;
        Ok(())
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Document for TextDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn line_number(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    fn line_start_offset(&self, line: usize) -> u32 {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or_else(|| self.text_len())
    }

    fn line_end_offset(&self, line: usize) -> u32 {
        match self.line_starts.get(line + 1) {
            Some(&next) => next - 1,
            None => self.text_len(),
        }
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

fn line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
        }
    }
    starts
}

/// Apply sorted, non-overlapping edits to `text` and return the result.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
    let mut prev: Option<TextRange> = None;
    for edit in edits {
        let range = edit.range;
        if range.end > len {
            return Err(EditError::OutOfBounds { range, len });
        }
        if !text.is_char_boundary(range.start as usize) || !text.is_char_boundary(range.end as usize)
        {
            return Err(EditError::NotCharBoundary { range });
        }
        if let Some(prev) = prev {
            if range.start < prev.end || (range.start == prev.start && prev.is_empty()) {
                return Err(EditError::Unordered { prev, next: range });
            }
        }
        prev = Some(range);
    }

    let growth: i64 = edits.iter().map(TextEdit::delta).sum();
    let capacity = usize::try_from(text.len() as i64 + growth).unwrap_or(text.len());
    let mut out = String::with_capacity(capacity);
    let mut cursor = 0usize;
    for edit in edits {
        out.push_str(&text[cursor..edit.range.start as usize]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end as usize;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
