//! Namespace tree — an index-addressed arena of namespace nodes.
//!
//! Each node stores its parent index and a name → child-index map, so
//! ancestor walks are O(depth) without parent/child ownership cycles.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use rook_syntax::Location;

use crate::ids::{Declaration, SpaceId};

/// One namespace.
#[derive(Debug, Clone)]
pub struct AbstractSpace {
    pub id: SpaceId,
    pub parent: Option<SpaceId>,
    pub name: String,
    pub children: IndexMap<String, SpaceId>,
    /// Name → overload group, in declaration order.
    pub declarations: IndexMap<String, Vec<Declaration>>,
    /// Every place that names this namespace.
    pub references: IndexSet<Location>,
    /// Documents that open this namespace. A non-root namespace with no
    /// contributors, children or declarations is pruned.
    pub documents: BTreeSet<String>,
}

impl AbstractSpace {
    fn new(id: SpaceId, parent: Option<SpaceId>, name: &str) -> Self {
        Self {
            id,
            parent,
            name: name.to_string(),
            children: IndexMap::new(),
            declarations: IndexMap::new(),
            references: IndexSet::new(),
            documents: BTreeSet::new(),
        }
    }

    /// The overload group for `name`, empty if none.
    pub fn lookup(&self, name: &str) -> &[Declaration] {
        self.declarations
            .get(name)
            .map(|group| group.as_slice())
            .unwrap_or(&[])
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.declarations.is_empty() && self.documents.is_empty()
    }
}

/// All namespaces of one library. Slot 0 is the root.
#[derive(Debug, Clone)]
pub struct SpaceArena {
    spaces: Vec<Option<AbstractSpace>>,
    free: Vec<SpaceId>,
}

impl SpaceArena {
    pub fn new(root_name: &str) -> Self {
        Self {
            spaces: vec![Some(AbstractSpace::new(0, None, root_name))],
            free: vec![],
        }
    }

    pub fn root(&self) -> SpaceId {
        0
    }

    pub fn get(&self, id: SpaceId) -> Option<&AbstractSpace> {
        self.spaces.get(id as usize).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: SpaceId) -> Option<&mut AbstractSpace> {
        self.spaces.get_mut(id as usize).and_then(|slot| slot.as_mut())
    }

    pub fn find_child(&self, parent: SpaceId, name: &str) -> Option<SpaceId> {
        self.get(parent)?.children.get(name).copied()
    }

    /// Return the child called `name`, creating it on demand.
    pub fn child(&mut self, parent: SpaceId, name: &str) -> SpaceId {
        if let Some(existing) = self.find_child(parent, name) {
            return existing;
        }
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                self.spaces.push(None);
                (self.spaces.len() - 1) as SpaceId
            }
        };
        self.spaces[id as usize] = Some(AbstractSpace::new(id, Some(parent), name));
        if let Some(parent) = self.get_mut(parent) {
            parent.children.insert(name.to_string(), id);
        }
        id
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: SpaceId) -> Vec<SpaceId> {
        let mut chain = vec![];
        let mut current = Some(id);
        while let Some(space) = current.and_then(|id| self.get(id)) {
            chain.push(space.id);
            current = space.parent;
        }
        chain
    }

    /// Whether `id` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, id: SpaceId, ancestor: SpaceId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Dotted name below the root; the root itself renders as "".
    pub fn full_name(&self, id: SpaceId) -> String {
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .filter(|&space| space != self.root())
            .filter_map(|space| self.get(space).map(|s| s.name.as_str()))
            .collect();
        segments.reverse();
        segments.join(".")
    }

    /// Add `declaration` to the overload group `name` of `space`.
    pub fn declare(&mut self, space: SpaceId, name: &str, declaration: Declaration) {
        if let Some(space) = self.get_mut(space) {
            let group = space.declarations.entry(name.to_string()).or_default();
            if !group.contains(&declaration) {
                group.push(declaration);
            }
        }
    }

    /// Remove `declaration` from the group `name` of `space`, dropping the
    /// group when it empties.
    pub fn undeclare(&mut self, space: SpaceId, name: &str, declaration: &Declaration) {
        if let Some(space) = self.get_mut(space) {
            if let Some(group) = space.declarations.get_mut(name) {
                group.retain(|existing| existing != declaration);
                if group.is_empty() {
                    space.declarations.shift_remove(name);
                }
            }
        }
    }

    /// Detach `space` from its parent if nothing keeps it alive, then try
    /// the same for each ancestor.
    pub fn prune(&mut self, space: SpaceId) {
        let mut current = Some(space);
        while let Some(id) = current {
            if id == self.root() {
                return;
            }
            let Some(node) = self.get(id) else { return };
            if !node.is_empty() {
                return;
            }
            let parent = node.parent;
            let name = node.name.clone();
            if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
                parent.children.shift_remove(&name);
            }
            self.spaces[id as usize] = None;
            self.free.push(id);
            current = parent;
        }
    }

    /// All live namespaces in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &AbstractSpace> {
        self.spaces.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
