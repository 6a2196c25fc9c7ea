//! Common types shared across all syntax nodes.

use serde::{Deserialize, Serialize};

/// Position in a source document (0-indexed line and character).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A range in a source document. `end` is exclusive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Single-line range covering `len` characters from `(line, character)`.
    pub fn on_line(line: u32, character: u32, len: u32) -> Self {
        Self {
            start: Position::new(line, character),
            end: Position::new(line, character + len),
        }
    }

    /// Whether `position` lies inside this range. The end position counts,
    /// so a cursor placed right after a name still hits it.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Whether this range lies entirely inside `other`.
    pub fn within(&self, other: &Range) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    /// Merge two ranges into one that covers both.
    pub fn merge(self, other: Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Rough size used to pick the innermost of two overlapping ranges.
    pub fn extent(&self) -> (u32, u32) {
        let lines = self.end.line.saturating_sub(self.start.line);
        let chars = if lines == 0 {
            self.end.character.saturating_sub(self.start.character)
        } else {
            self.end.character
        };
        (lines, chars)
    }
}

/// A range inside a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub document: String,
    pub range: Range,
}

impl Location {
    pub fn new(document: impl Into<String>, range: Range) -> Self {
        Self {
            document: document.into(),
            range,
        }
    }
}

/// Identifier with source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub range: Range,
}

impl Ident {
    pub fn new(name: impl Into<String>, range: Range) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

/// Visibility modifier written in front of a declaration.
///
/// `None` means no recognized modifier was written: the declaration is
/// private to its defining document (or, for members, to its owner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    None,
    Public,
    Internal,
    Space,
    Protected,
}

impl Visibility {
    /// Map a modifier keyword to its visibility.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "public" => Some(Visibility::Public),
            "internal" => Some(Visibility::Internal),
            "space" => Some(Visibility::Space),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::None),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::None => "private",
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Space => "space",
            Visibility::Protected => "protected",
        }
    }
}
