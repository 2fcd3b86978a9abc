//! Line tables and 1-based source positions.

/// One line's byte span within a snapshot's raw buffer.
///
/// `start_offset` is inclusive; `newline_start` is the exclusive end of the
/// line's content (the newline byte itself, if any, sits at this offset).
/// `bytes[start_offset..newline_start]` never contains `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start_offset: usize,
    pub newline_start: usize,
}

/// An ordered sequence of line spans covering a buffer, plus the lookup
/// needed to turn a byte offset into a 1-based `(line, column)` pair.
#[derive(Debug, Clone, Default)]
pub struct LineTable {
    lines: Vec<LineSpan>,
}

impl LineTable {
    pub fn build(content: &[u8]) -> Self {
        let mut lines = Vec::new();
        let mut start = 0usize;
        for (i, &b) in content.iter().enumerate() {
            if b == b'\n' {
                lines.push(LineSpan {
                    start_offset: start,
                    newline_start: i,
                });
                start = i + 1;
            }
        }
        lines.push(LineSpan {
            start_offset: start,
            newline_start: content.len(),
        });
        LineTable { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[LineSpan] {
        &self.lines
    }

    /// 1-based `(line, column)` for a byte offset. Columns count bytes, not
    /// Unicode scalars — callers that need grapheme-aware columns convert
    /// at the presentation layer.
    pub fn position_for_offset(&self, offset: usize) -> (u32, u32) {
        match self
            .lines
            .binary_search_by(|span| {
                if offset < span.start_offset {
                    std::cmp::Ordering::Greater
                } else if offset > span.newline_start {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            }) {
            Ok(idx) => {
                let span = &self.lines[idx];
                ((idx + 1) as u32, (offset - span.start_offset + 1) as u32)
            }
            Err(idx) => {
                // Offset sits exactly on a newline boundary between two spans
                // (binary_search's Ordering::Equal window is half-open by
                // construction above, so this branch is effectively
                // unreachable for in-bounds offsets, but we fall back to the
                // last line defensively for `offset == content.len()`).
                let idx = idx.min(self.lines.len().saturating_sub(1));
                let span = &self.lines[idx];
                ((idx + 1) as u32, (offset.saturating_sub(span.start_offset) + 1) as u32)
            }
        }
    }
}

/// A 1-based, inclusive-inclusive source range. Invalid iff either endpoint
/// is unset (represented by the `Option` wrapper at the call sites that
/// derive this from token indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourcePosition {
    pub fn is_valid(&self, line_count: usize) -> bool {
        self.start_line >= 1
            && self.start_line <= self.end_line
            && (self.end_line as usize) <= line_count
    }
}
