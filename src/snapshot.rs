//! An immutable view of one editor buffer.
//!
//! Core offsets are byte offsets into the text. Positions exchanged with the
//! editor are 0-based lines and UTF-16 code unit columns (the protocol's
//! default encoding), computed with a rope the same way for the live buffer
//! and for parsed files.

use std::ops::Range;
use std::path::{Path, PathBuf};

use ropey::Rope;
use tower_lsp::lsp_types::Position;

#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
    text: String,
    rope: Rope,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Snapshot {
        let text = text.into();
        let rope = Rope::from_str(&text);

        Snapshot {
            path: path.into(),
            text,
            rope,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The line containing `offset`, without its line ending, and the offset
    /// where that line starts.
    pub fn line_extent(&self, offset: usize) -> (&str, usize) {
        let offset = offset.min(self.text.len());
        let line = self.rope.byte_to_line(offset);
        let start = self.rope.line_to_byte(line);
        let end = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_byte(line + 1)
        } else {
            self.text.len()
        };

        let line_text = self
            .text
            .get(start..end)
            .unwrap_or_default()
            .trim_end_matches(['\n', '\r']);

        (line_text, start)
    }

    pub fn position_at(&self, offset: usize) -> Position {
        position_at(&self.rope, offset)
    }

    /// Byte offset of a position, clamped to the end of its line.
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        if line >= self.rope.len_lines() {
            return None;
        }

        let line_start = self.rope.line_to_char(line);
        let line_slice = self.rope.line(line);
        let mut line_len = line_slice.len_chars();
        while line_len > 0 && matches!(line_slice.char(line_len - 1), '\n' | '\r') {
            line_len -= 1;
        }

        let start_cu = self.rope.char_to_utf16_cu(line_start);
        let end_cu = self.rope.char_to_utf16_cu(line_start + line_len);
        let cu = (start_cu + position.character as usize).min(end_cu);

        Some(self.rope.char_to_byte(self.rope.utf16_cu_to_char(cu)))
    }

    pub fn range_of(&self, range: Range<usize>) -> tower_lsp::lsp_types::Range {
        tower_lsp::lsp_types::Range {
            start: self.position_at(range.start),
            end: self.position_at(range.end),
        }
    }
}

/// Convert a byte offset into a 0-based line and UTF-16 column.
pub fn position_at(rope: &Rope, offset: usize) -> Position {
    let char_idx = rope.byte_to_char(offset.min(rope.len_bytes()));
    let line = rope.char_to_line(char_idx);
    let character =
        rope.char_to_utf16_cu(char_idx) - rope.char_to_utf16_cu(rope.line_to_char(line));

    Position {
        line: line as u32,
        character: character as u32,
    }
}
