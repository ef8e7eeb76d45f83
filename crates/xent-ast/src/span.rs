//! Source location tracking for error reporting.

use std::fmt;

/// Compact source location reference.
///
/// Points to a byte range inside a single program line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Program line (0-based)
    pub line: u16,
    /// Byte offset of start position within the line
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(line: u16, start: u32, end: u32) -> Self {
        Self { line, start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            line: self.line,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extract the covered text from the line this span points into.
    pub fn snippet<'a>(&self, line_source: &'a str) -> &'a str {
        line_source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}..{}", self.line, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_snippet() {
        let a = Span::new(3, 7, 9);
        let b = Span::new(3, 2, 4);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(3, 2, 9));
        assert_eq!(merged.snippet("reward(xent(x))"), "ward(xe");
        assert_eq!(Span::new(0, 40, 50).snippet("short"), "");
    }
}
