// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::Store;
use super::file::MemoryFile;
use super::state::{Node, NodeId, ROOT_ID};
use crate::error::{Error, Result};
use crate::name::{display_name, validate_name};
use crate::provider::{DirHandle, Entry, FileHandle, VirtualDirectory};
use async_trait::async_trait;
use diagnostics::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A directory reference into a [`super::MemoryProvider`] tree
pub struct MemoryDirectory {
    store: Arc<Store>,
    id: NodeId,
    name: Option<Vec<u8>>,
}

impl MemoryDirectory {
    pub(super) fn root(store: Arc<Store>) -> Self {
        Self {
            store,
            id: ROOT_ID,
            name: None,
        }
    }

    fn child(&self, id: NodeId, name: Vec<u8>) -> Self {
        Self {
            store: self.store.clone(),
            id,
            name: Some(name),
        }
    }

    fn name_bytes(&self) -> &[u8] {
        self.name.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl VirtualDirectory for MemoryDirectory {
    fn name(&self) -> Option<&[u8]> {
        self.name.as_deref()
    }

    async fn list(&self) -> Result<BTreeMap<Vec<u8>, Entry>> {
        let state = self.store.state.lock().await;
        let entries = state.entries(self.id, self.name_bytes())?;
        let mut listing = BTreeMap::new();
        for (name, &id) in entries {
            let entry = match state.node(id) {
                Some(Node::File { .. }) => Entry::File(FileHandle::new(MemoryFile::new(
                    self.store.clone(),
                    id,
                    name.clone(),
                ))),
                Some(Node::Directory { .. }) => {
                    Entry::Directory(DirHandle::new(self.child(id, name.clone())))
                }
                None => return Err(Error::backend(format!("dangling node {}", id))),
            };
            listing.insert(name.clone(), entry);
        }
        Ok(listing)
    }

    async fn create_file(&self, name: &[u8]) -> Result<FileHandle> {
        validate_name(name)?;
        let mut state = self.store.state.lock().await;
        let modified = self.store.now();
        let (id, created) = state.get_or_insert(self.id, self.name_bytes(), name, || Node::File {
            content: Vec::new(),
            modified,
        })?;
        drop(state);
        if created {
            let name = display_name(name).to_string();
            debug!("created file {name}", name: name);
        }
        Ok(FileHandle::new(MemoryFile::new(
            self.store.clone(),
            id,
            name.to_vec(),
        )))
    }

    async fn create_directory(&self, name: &[u8]) -> Result<DirHandle> {
        validate_name(name)?;
        let (id, created) = self.store.state.lock().await.get_or_insert(
            self.id,
            self.name_bytes(),
            name,
            || Node::Directory {
                entries: BTreeMap::new(),
            },
        )?;
        if created {
            let name = display_name(name).to_string();
            debug!("created directory {name}", name: name);
        }
        Ok(DirHandle::new(self.child(id, name.to_vec())))
    }

    async fn delete(&self, name: &[u8]) -> Result<()> {
        validate_name(name)?;
        let removed = self
            .store
            .state
            .lock()
            .await
            .remove(self.id, self.name_bytes(), name)?;
        if removed {
            let name = display_name(name).to_string();
            debug!("deleted {name}", name: name);
        }
        Ok(())
    }
}
