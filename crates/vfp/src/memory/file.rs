// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::Store;
use super::state::NodeId;
use crate::error::{Error, Result, check_range};
use crate::provider::{SHA512_LEN, Sha512Digest, VirtualFile};
use async_trait::async_trait;
use diagnostics::*;
use sha2::{Digest, Sha512};
use std::sync::Arc;

/// A file reference into a [`super::MemoryProvider`] tree
pub struct MemoryFile {
    store: Arc<Store>,
    id: NodeId,
    name: Vec<u8>,
}

impl MemoryFile {
    pub(super) fn new(store: Arc<Store>, id: NodeId, name: Vec<u8>) -> Self {
        Self { store, id, name }
    }
}

fn to_usize(n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| Error::backend(format!("{} bytes exceeds addressable memory", n)))
}

#[async_trait]
impl VirtualFile for MemoryFile {
    fn name(&self) -> &[u8] {
        &self.name
    }

    async fn size(&self) -> Result<u64> {
        let state = self.store.state.lock().await;
        let (content, _) = state.file(self.id, &self.name)?;
        Ok(content.len() as u64)
    }

    async fn last_modified(&self) -> Result<Option<u64>> {
        let state = self.store.state.lock().await;
        let (_, modified) = state.file(self.id, &self.name)?;
        Ok(self.store.options.track_timestamps.then_some(modified))
    }

    async fn sha512(&self) -> Result<Option<Sha512Digest>> {
        let state = self.store.state.lock().await;
        let (content, _) = state.file(self.id, &self.name)?;
        if !self.store.options.compute_digest {
            return Ok(None);
        }
        let mut digest = [0u8; SHA512_LEN];
        digest.copy_from_slice(&Sha512::digest(content));
        Ok(Some(digest))
    }

    async fn read_range(&self, offset: u64, count: usize) -> Result<Vec<u8>> {
        let state = self.store.state.lock().await;
        let (content, _) = state.file(self.id, &self.name)?;
        check_range(offset, count as u64, content.len() as u64)?;
        let start = to_usize(offset)?;
        Ok(content[start..start + count].to_vec())
    }

    async fn read(&self) -> Result<Vec<u8>> {
        let state = self.store.state.lock().await;
        let (content, _) = state.file(self.id, &self.name)?;
        Ok(content.to_vec())
    }

    async fn write_at(&self, offset: u64, contents: &[u8]) -> Result<()> {
        let mut state = self.store.state.lock().await;
        let now = self.store.now();
        let (content, modified) = state.file_mut(self.id, &self.name)?;
        check_range(offset, 0, content.len() as u64)?;

        let start = to_usize(offset)?;
        let end = start + contents.len();
        let grew = end > content.len();
        if grew {
            content.resize(end, 0);
        }
        if grew || content[start..end] != *contents {
            content[start..end].copy_from_slice(contents);
            *modified = now.max(*modified);
        }
        let count = contents.len();
        debug!("wrote {count} bytes at {offset}", count: count, offset: offset);
        Ok(())
    }

    async fn write(&self, contents: &[u8]) -> Result<()> {
        let mut state = self.store.state.lock().await;
        let now = self.store.now();
        let (content, modified) = state.file_mut(self.id, &self.name)?;
        if content.as_slice() != contents {
            *content = contents.to_vec();
            *modified = now.max(*modified);
        }
        let count = contents.len();
        debug!("replaced contents with {count} bytes", count: count);
        Ok(())
    }

    async fn resize(&self, size: u64) -> Result<()> {
        let new_len = to_usize(size)?;
        let mut state = self.store.state.lock().await;
        let now = self.store.now();
        let (content, modified) = state.file_mut(self.id, &self.name)?;
        if content.len() != new_len {
            content.resize(new_len, 0);
            *modified = now.max(*modified);
        }
        debug!("resized to {size} bytes", size: size);
        Ok(())
    }
}
