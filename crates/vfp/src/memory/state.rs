// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::EntryType;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};

pub(super) type NodeId = u64;

pub(super) const ROOT_ID: NodeId = 0;

pub(super) enum Node {
    File { content: Vec<u8>, modified: u64 },
    Directory { entries: BTreeMap<Vec<u8>, NodeId> },
}

impl Node {
    pub(super) fn entry_type(&self) -> EntryType {
        match self {
            Node::File { .. } => EntryType::File,
            Node::Directory { .. } => EntryType::Directory,
        }
    }
}

/// The whole tree. Callers hold the store lock for the duration of one
/// operation, which is what makes every operation atomic.
pub(super) struct State {
    nodes: HashMap<NodeId, Node>,
    next_id: NodeId,
}

impl Default for State {
    fn default() -> Self {
        Self {
            nodes: HashMap::from([(
                ROOT_ID,
                Node::Directory {
                    entries: BTreeMap::new(),
                },
            )]),
            next_id: ROOT_ID + 1,
        }
    }
}

impl State {
    pub(super) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Resolve a file node; `name` is only used for the error.
    pub(super) fn file_mut(&mut self, id: NodeId, name: &[u8]) -> Result<(&mut Vec<u8>, &mut u64)> {
        match self.nodes.get_mut(&id) {
            Some(Node::File { content, modified }) => Ok((content, modified)),
            _ => Err(Error::not_found(name)),
        }
    }

    pub(super) fn file(&self, id: NodeId, name: &[u8]) -> Result<(&[u8], u64)> {
        match self.nodes.get(&id) {
            Some(Node::File { content, modified }) => Ok((content.as_slice(), *modified)),
            _ => Err(Error::not_found(name)),
        }
    }

    pub(super) fn entries(&self, id: NodeId, name: &[u8]) -> Result<&BTreeMap<Vec<u8>, NodeId>> {
        match self.nodes.get(&id) {
            Some(Node::Directory { entries }) => Ok(entries),
            _ => Err(Error::not_found(name)),
        }
    }

    fn entries_mut(&mut self, id: NodeId, name: &[u8]) -> Result<&mut BTreeMap<Vec<u8>, NodeId>> {
        match self.nodes.get_mut(&id) {
            Some(Node::Directory { entries }) => Ok(entries),
            _ => Err(Error::not_found(name)),
        }
    }

    /// Return the child `child` of `parent`, creating it from `make` when it
    /// is absent. Fails if the existing child is of the other kind.
    pub(super) fn get_or_insert(
        &mut self,
        parent: NodeId,
        parent_name: &[u8],
        child: &[u8],
        make: impl FnOnce() -> Node,
    ) -> Result<(NodeId, bool)> {
        let wanted = make();
        let existing = self.entries(parent, parent_name)?.get(child).copied();
        if let Some(id) = existing {
            let kind = self
                .nodes
                .get(&id)
                .map(Node::entry_type)
                .ok_or_else(|| Error::backend(format!("dangling node {}", id)))?;
            if kind != wanted.entry_type() {
                return Err(Error::kind_conflict(child, kind));
            }
            return Ok((id, false));
        }

        let id = self.next_id;
        self.next_id += 1;
        let _ = self.entries_mut(parent, parent_name)?.insert(child.to_vec(), id);
        let _ = self.nodes.insert(id, wanted);
        Ok((id, true))
    }

    /// Unlink `child` from `parent` and drop its subtree. Returns whether
    /// anything was removed.
    pub(super) fn remove(&mut self, parent: NodeId, parent_name: &[u8], child: &[u8]) -> Result<bool> {
        let Some(id) = self.entries_mut(parent, parent_name)?.remove(child) else {
            return Ok(false);
        };

        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(Node::Directory { entries }) = self.nodes.remove(&id) {
                pending.extend(entries.into_values());
            }
        }
        Ok(true)
    }

    #[cfg(test)]
    pub(super) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_file() -> Node {
        Node::File {
            content: Vec::new(),
            modified: 0,
        }
    }

    fn empty_dir() -> Node {
        Node::Directory {
            entries: BTreeMap::new(),
        }
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut state = State::default();
        let (a, _) = state.get_or_insert(ROOT_ID, b"", b"a", empty_dir).unwrap();
        let (b, _) = state.get_or_insert(a, b"a", b"b", empty_dir).unwrap();
        state.get_or_insert(b, b"b", b"f", empty_file).unwrap();
        assert_eq!(state.node_count(), 4);

        assert!(state.remove(ROOT_ID, b"", b"a").unwrap());
        assert_eq!(state.node_count(), 1);
        assert!(!state.remove(ROOT_ID, b"", b"a").unwrap());
    }

    #[test]
    fn test_get_or_insert_is_idempotent() {
        let mut state = State::default();
        let (first, created) = state.get_or_insert(ROOT_ID, b"", b"f", empty_file).unwrap();
        assert!(created);
        let (second, created) = state.get_or_insert(ROOT_ID, b"", b"f", empty_file).unwrap();
        assert!(!created);
        assert_eq!(first, second);

        let err = state.get_or_insert(ROOT_ID, b"", b"f", empty_dir).unwrap_err();
        assert!(matches!(
            err,
            Error::KindConflict {
                existing: EntryType::File,
                ..
            }
        ));
    }
}
