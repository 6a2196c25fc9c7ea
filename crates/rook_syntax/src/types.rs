//! Type reference nodes.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A syntactic type reference: a dotted name plus an array rank.
///
/// `integer` is `path = [integer], dimension = 0`; `a.b.Point[][]` is
/// `path = [a, b, Point], dimension = 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub path: Vec<Ident>,
    pub dimension: u32,
    pub range: Range,
}

impl TypeRef {
    pub fn new(path: Vec<Ident>, dimension: u32) -> Self {
        let range = match (path.first(), path.last()) {
            (Some(first), Some(last)) => first.range.merge(last.range),
            _ => Range::default(),
        };
        Self {
            path,
            dimension,
            range,
        }
    }

    /// The final segment, i.e. the simple type name.
    pub fn name(&self) -> Option<&Ident> {
        self.path.last()
    }

    /// The dotted name without array brackets.
    pub fn dotted(&self) -> String {
        self.path
            .iter()
            .map(|ident| ident.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dotted())?;
        for _ in 0..self.dimension {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
