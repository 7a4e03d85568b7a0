//! Buffer-independent text value types.
//!
//! The dispatch engine never touches buffer contents; it hands `Position`s
//! to external text-object resolvers and receives `Range`s back. Both are
//! plain value types: `line` is a zero-based line index, `byte` a byte
//! offset within that line. Ordering is lexicographic (line, then byte),
//! which is what range normalization relies on.

pub mod recase;

pub use recase::CaseStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }

    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }
}

/// Half-open span `[start, end)` within a buffer. Constructors normalize
/// ordering so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(mut a: Position, mut b: Position) -> Self {
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        Self { start: a, end: b }
    }

    pub fn empty_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Resolution scope for text objects: `Inner` excludes the delimiters /
/// surrounding whitespace, `Around` includes them (Vim's `i` vs `a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Inner,
    Around,
}
