//! Visibility rules.

use std::collections::HashSet;

use rook_model::{AbstractDeclaration, Declaration, LibrarySet};
use rook_syntax::Visibility;

use crate::context::Context;

/// The parent chain of a class, nearest first, excluding the class itself.
/// Stops at the first repeat so circular inheritance cannot loop.
pub fn class_ancestors(libraries: &LibrarySet, class: &Declaration) -> Vec<Declaration> {
    let mut chain = vec![];
    let mut seen = HashSet::new();
    seen.insert(*class);
    let mut current = *class;
    while let Some(parent) = libraries
        .declaration(&current)
        .and_then(|record| record.as_class())
        .and_then(|class| class.parent)
        .and_then(|ty| ty.declaration())
    {
        if !seen.insert(parent) {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

impl Context<'_> {
    /// Whether `declaration` may be referred to from this context.
    pub fn is_visible(&self, declaration: &Declaration) -> bool {
        if declaration.library.is_kernel() {
            return true;
        }
        let Some(record) = self.libraries.declaration(declaration) else {
            return false;
        };
        let same_library = declaration.library == self.space.library;
        match declaration.owner() {
            None if same_library => self.local_visible(record),
            None => record.declaration.visibility == Visibility::Public,
            Some(owner) => {
                let Some(owner_record) = self.libraries.declaration(&owner) else {
                    return false;
                };
                if same_library {
                    self.local_member_visible(record, owner_record)
                } else {
                    self.foreign_member_visible(record, owner_record)
                }
            }
        }
    }

    /// Top-level declaration of the context's own library.
    fn local_visible(&self, record: &AbstractDeclaration) -> bool {
        match record.declaration.visibility {
            Visibility::Public | Visibility::Internal => true,
            Visibility::Space => self.within_space_of(record),
            Visibility::None | Visibility::Protected => record.document == self.document,
        }
    }

    fn local_member_visible(&self, member: &AbstractDeclaration, owner: &AbstractDeclaration) -> bool {
        if self.declaration == Some(owner.declaration) {
            return true;
        }
        if !self.local_visible(owner) {
            return false;
        }
        match member.declaration.visibility {
            Visibility::Public | Visibility::Internal => true,
            Visibility::Space => self.within_space_of(member),
            Visibility::None | Visibility::Protected => self.inherits_from(&owner.declaration),
        }
    }

    fn foreign_member_visible(&self, member: &AbstractDeclaration, owner: &AbstractDeclaration) -> bool {
        match member.declaration.visibility {
            Visibility::Public => owner.declaration.visibility == Visibility::Public,
            Visibility::Protected => {
                self.declaration == Some(owner.declaration) || self.inherits_from(&owner.declaration)
            }
            _ => false,
        }
    }

    fn within_space_of(&self, record: &AbstractDeclaration) -> bool {
        if record.declaration.library != self.space.library {
            return false;
        }
        self.libraries
            .get(self.space.library)
            .is_some_and(|lib| lib.spaces.is_within(self.space.space, record.space))
    }

    /// Whether the enclosing class has `class` somewhere up its parent chain.
    fn inherits_from(&self, class: &Declaration) -> bool {
        match self.declaration {
            Some(current) => class_ancestors(self.libraries, &current).contains(class),
            None => false,
        }
    }
}
