//! Source positions: byte offsets via [`text_size`], plus line/column
//! conversion for human-facing diagnostics.

use text_size::TextSize;

/// A 0-indexed line/column position, for diagnostic rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A line/column range, used when a byte-range diagnostic is rendered for
/// a human reader instead of tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn from_coords(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }
}

/// A line/column pair in the coordinate system used by [`LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets to line/column positions for a single source text.
///
/// Built once per parse from the newline offsets; lookups are a binary
/// search over that table, turning a byte offset into an LSP-style
/// line/column position.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line (line 0 always starts at 0).
    newlines: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut newlines = vec![TextSize::from(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                newlines.push(TextSize::from(i as u32 + 1));
            }
        }
        Self { newlines }
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = match self.newlines.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let col = offset - self.newlines[line];
        LineCol {
            line: line as u32,
            col: u32::from(col),
        }
    }

    pub fn to_position(&self, offset: TextSize) -> Position {
        let lc = self.line_col(offset);
        Position::new(lc.line as usize, lc.col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_first_line() {
        let idx = LineIndex::new("abc\ndef\nghi");
        assert_eq!(idx.line_col(TextSize::from(0)), LineCol { line: 0, col: 0 });
        assert_eq!(idx.line_col(TextSize::from(2)), LineCol { line: 0, col: 2 });
    }

    #[test]
    fn line_index_crosses_newline() {
        let idx = LineIndex::new("abc\ndef\nghi");
        assert_eq!(idx.line_col(TextSize::from(4)), LineCol { line: 1, col: 0 });
        assert_eq!(idx.line_col(TextSize::from(9)), LineCol { line: 2, col: 1 });
    }

    #[test]
    fn span_contains() {
        let span = Span::from_coords(1, 2, 3, 0);
        assert!(span.contains(Position::new(2, 100)));
        assert!(!span.contains(Position::new(0, 0)));
        assert!(!span.contains(Position::new(3, 1)));
    }
}
