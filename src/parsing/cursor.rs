//! Per-character cursor map over a document snapshot.
//!
//! A CursorMap records, for every character of the text plus one sentinel
//! at end-of-file, its (line, character) position and its byte offset.
//! Cursors are lightweight handles into that table; the parser walks them
//! through a Navigator, and tree nodes remember them by index so that a
//! node's exact source text can always be recovered by slicing.

use crate::language::Position;

#[derive(Clone, Copy, Eq, Debug, PartialEq)]
struct Point {
    line: u32,
    character: u32,
    offset: usize,
}

/// A document snapshot with one addressable cursor per character position,
/// plus a sentinel end-of-file cursor.
#[derive(Eq, Debug, PartialEq)]
pub struct CursorMap {
    content: String,
    points: Vec<Point>,
}

/// An anchor for [`CursorMap::get`]: a raw cursor index or a (line,
/// character) position. Both resolve to a cursor, clamping to end-of-file
/// when out of range.
#[derive(Clone, Copy, Debug)]
pub enum Locator {
    Index(usize),
    Position(Position),
}

impl From<usize> for Locator {
    fn from(index: usize) -> Locator {
        Locator::Index(index)
    }
}

impl From<Position> for Locator {
    fn from(position: Position) -> Locator {
        Locator::Position(position)
    }
}

impl<'m> From<Cursor<'m>> for Locator {
    fn from(cursor: Cursor<'m>) -> Locator {
        Locator::Index(cursor.index)
    }
}

impl CursorMap {
    pub fn new(content: &str) -> CursorMap {
        let mut points = Vec::with_capacity(content.len() + 1);

        let mut line = 0;
        let mut character = 0;
        for (offset, c) in content.char_indices() {
            points.push(Point {
                line,
                character,
                offset,
            });
            if c == '\n' {
                line += 1;
                character = 0;
            } else {
                character += 1;
            }
        }

        // sentinel end-of-file cursor
        points.push(Point {
            line,
            character,
            offset: content.len(),
        });

        CursorMap {
            content: content.to_owned(),
            points,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of cursors, including the end-of-file sentinel.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn eof_index(&self) -> usize {
        self.points.len() - 1
    }

    pub fn eof(&self) -> Cursor<'_> {
        self.cursor(self.eof_index())
    }

    pub fn sof(&self) -> Cursor<'_> {
        self.cursor(0)
    }

    /// Resolve a position to its cursor index, clamping anything outside
    /// the document to the end-of-file sentinel.
    pub fn get_index(&self, position: Position) -> usize {
        self.points
            .binary_search_by(|point| {
                (point.line, point.character).cmp(&(position.line, position.character))
            })
            .unwrap_or(self.eof_index())
    }

    /// Resolve an index or position to a cursor, clamping out-of-range
    /// values to the end-of-file sentinel.
    pub fn cursor(&self, locator: impl Into<Locator>) -> Cursor<'_> {
        let index = match locator.into() {
            Locator::Index(index) => index.min(self.eof_index()),
            Locator::Position(position) => self.get_index(position),
        };
        Cursor { map: self, index }
    }

    /// The text between two cursor-like anchors, swapping them if given
    /// out of order.
    pub fn get(&self, from: impl Into<Locator>, to: impl Into<Locator>) -> &str {
        let mut a = self.cursor(from).point().offset;
        let mut b = self.cursor(to).point().offset;
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        &self.content[a..b]
    }

    pub fn navigator(&self) -> Navigator<'_> {
        Navigator {
            map: self,
            current: 0,
        }
    }
}

/// An immutable handle to one character position of a CursorMap.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'m> {
    map: &'m CursorMap,
    index: usize,
}

impl<'m> Cursor<'m> {
    fn point(&self) -> Point {
        self.map.points[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Position {
        let point = self.point();
        Position::new(point.line, point.character)
    }

    /// Byte offset into the document text.
    pub fn offset(&self) -> usize {
        self.point().offset
    }

    /// The character immediately ahead of this cursor, `None` at
    /// end-of-file.
    pub fn next_char(&self) -> Option<char> {
        self.map.content[self.point().offset..].chars().next()
    }

    /// The character immediately behind this cursor, `None` at the start.
    pub fn prev_char(&self) -> Option<char> {
        self.map.content[..self.point().offset].chars().next_back()
    }

    /// The cursor `count` positions away, clamped to the valid range.
    pub fn offset_by(&self, count: isize) -> Cursor<'m> {
        let index = self.index as isize + count;
        self.map.cursor(index.max(0) as usize)
    }

    /// The text from this cursor up to another anchor.
    pub fn get_to(&self, to: impl Into<Locator>) -> &'m str {
        self.map.get(self.index, to)
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Cursor<'_> {}

impl PartialOrd for Cursor<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

/// A movable pointer over a CursorMap, used by the parser to advance and
/// backtrack one character at a time.
#[derive(Debug)]
pub struct Navigator<'m> {
    map: &'m CursorMap,
    current: usize,
}

impl<'m> Navigator<'m> {
    pub fn current(&self) -> Cursor<'m> {
        self.map.cursor(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Move by `count` cursors. Fails without moving if the target would
    /// fall past the end-of-file sentinel or before the start.
    pub fn move_by(&mut self, count: isize) -> bool {
        let target = self.current as isize + count;
        if target < 0 || target as usize > self.map.eof_index() {
            return false;
        }
        self.current = target as usize;
        true
    }

    pub fn move_next(&mut self) -> bool {
        self.move_by(1)
    }

    pub fn move_back(&mut self) -> bool {
        self.move_by(-1)
    }
}
