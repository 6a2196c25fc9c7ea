//! Internal invariant violations.
//!
//! These are core bugs, never language-usage errors: user mistakes are
//! reported as [`crate::Diagnostic`]s instead.

use thiserror::Error;

use crate::ids::{Category, LibraryId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("index {index} of {category:?} in library {library} recycled while already free")]
    DoubleRecycle {
        library: LibraryId,
        category: Category,
        index: u32,
    },

    #[error("index {index} of {category:?} recycled in library {library}, only the project library is rebuilt")]
    ForeignRecycle {
        library: LibraryId,
        category: Category,
        index: u32,
    },

    #[error("{category:?} is a member category and is owned by its parent's list")]
    MemberCategory { category: Category },

    #[error("slot {index} of {category:?} already holds a live declaration")]
    SlotOccupied { category: Category, index: u32 },

    #[error("index {index} of {category:?} is past the end of its table ({len})")]
    IndexOutOfRange {
        category: Category,
        index: u32,
        len: u32,
    },
}
