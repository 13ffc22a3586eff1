//! Positions and ranges within a document, and the intersection algebra
//! used by the locate query and dominant range computation.

use std::cmp::Ordering;
use std::fmt;

/// A zero-based (line, character) point in a document. Characters are
/// counted in chars, not bytes.
#[derive(Clone, Copy, Eq, Debug, PartialEq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    pub fn compare(&self, other: &Position) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.character.cmp(&other.character))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A half-open interval of positions: the start is included, the end is
/// not.
#[derive(Clone, Copy, Eq, Debug, PartialEq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// How a candidate range sits relative to a reference range.
#[derive(Clone, Copy, Eq, Debug, PartialEq)]
pub enum Intersection {
    /// Entirely before the reference.
    Below,
    /// Entirely after the reference.
    Above,
    /// Overlaps only the reference's lower edge.
    Lower,
    /// Overlaps only the reference's upper edge.
    Upper,
    /// Covers both edges of the reference.
    Full,
    /// Fully contained within the reference.
    Contains,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Range {
        Range { start, end }
    }

    /// A zero-width range sitting at a single point.
    pub fn at(position: Position) -> Range {
        Range {
            start: position,
            end: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive of the start position, exclusive of the end.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    /// Classify how `target` intersects with this range. Zero-width
    /// targets collapse to a point: `Contains` when the point lies within
    /// this range, `Below` or `Above` otherwise.
    pub fn intersection(&self, target: Range) -> Intersection {
        if target.is_empty() {
            return if self.contains(target.start) {
                Intersection::Contains
            } else if target.start < self.start {
                Intersection::Below
            } else {
                Intersection::Above
            };
        }

        if target.end <= self.start {
            Intersection::Below
        } else if target.start >= self.end {
            Intersection::Above
        } else if target.start <= self.start && target.end >= self.end {
            Intersection::Full
        } else if target.start < self.start {
            Intersection::Lower
        } else if target.end > self.end {
            Intersection::Upper
        } else {
            Intersection::Contains
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
