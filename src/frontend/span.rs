// src/frontend/span.rs
//
// Source location span for diagnostics.
//
// Modeled on vole's `crates/vole-identity/src/span.rs` (same offset/line/column
// shape and the `From<Span> for SourceSpan` conversion), slimmed to the fields
// diagnostics and the offset-discriminator scheme actually use.

/// Source location span with byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize,  // Byte offset
    pub end: usize,    // Byte offset (exclusive)
    pub line: u32,     // Start line (1-indexed)
    pub column: u32,   // Start column (1-indexed)
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Byte offset of the span's start, used as a synthetic-name discriminator.
    pub fn offset(&self) -> usize {
        self.start
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // miette uses (offset, length)
        (span.start, span.end - span.start).into()
    }
}

impl From<&Span> for miette::SourceSpan {
    fn from(span: &Span) -> Self {
        (span.start, span.end - span.start).into()
    }
}
