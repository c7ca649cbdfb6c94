// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{Durability, HostRoot, host_error};
use crate::EntryType;
use crate::error::{Error, Result, check_range};
use crate::provider::{SHA512_LEN, Sha512Digest, VirtualFile};
use async_trait::async_trait;
use diagnostics::*;
use sha2::{Digest, Sha512};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

const HASH_CHUNK: usize = 64 * 1024;

/// Represents a file backed by a host filesystem file.
///
/// Reads go directly to the host file. `write` replaces the file through a
/// renamed temporary sibling; `write_at` and `resize` modify it in place.
pub struct HostFile {
    root: Arc<HostRoot>,
    host_path: PathBuf,
    name: Vec<u8>,
}

impl HostFile {
    pub(super) fn new(root: Arc<HostRoot>, host_path: PathBuf, name: Vec<u8>) -> Self {
        Self {
            root,
            host_path,
            name,
        }
    }

    /// Absolute host path of this file
    #[must_use]
    pub fn host_path(&self) -> &PathBuf {
        &self.host_path
    }

    async fn metadata(&self) -> Result<std::fs::Metadata> {
        let metadata = tokio::fs::metadata(&self.host_path)
            .await
            .map_err(|e| host_error(&self.name, e))?;
        if metadata.is_dir() {
            return Err(Error::kind_conflict(&self.name, EntryType::Directory));
        }
        Ok(metadata)
    }

    async fn open(&self, write: bool) -> Result<tokio::fs::File> {
        let _ = self.metadata().await?;
        tokio::fs::OpenOptions::new()
            .read(true)
            .write(write)
            .open(&self.host_path)
            .await
            .map_err(|e| host_error(&self.name, e))
    }

    async fn finish(&self, file: &tokio::fs::File) -> Result<()> {
        if self.root.durability == Durability::Sync {
            file.sync_all().await?;
        }
        Ok(())
    }

    async fn replace(
        &self,
        contents: &[u8],
        tmp: &PathBuf,
        permissions: std::fs::Permissions,
    ) -> Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        tokio::fs::set_permissions(tmp, permissions).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        self.finish(&file).await?;
        drop(file);
        tokio::fs::rename(tmp, &self.host_path).await?;
        Ok(())
    }
}

#[async_trait]
impl VirtualFile for HostFile {
    fn name(&self) -> &[u8] {
        &self.name
    }

    async fn size(&self) -> Result<u64> {
        Ok(self.metadata().await?.len())
    }

    async fn last_modified(&self) -> Result<Option<u64>> {
        let metadata = self.metadata().await?;
        Ok(metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .and_then(|d| u64::try_from(d.as_millis()).ok()))
    }

    async fn sha512(&self) -> Result<Option<Sha512Digest>> {
        let mut file = self.open(false).await?;
        let mut hasher = Sha512::new();
        let mut buf = vec![0u8; HASH_CHUNK];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        let mut digest = [0u8; SHA512_LEN];
        digest.copy_from_slice(&hasher.finalize());
        let path = self.host_path.display().to_string();
        let prefix = hex::encode(&digest[..8]);
        debug!("hashed {path} sha512 {prefix}", path: path, prefix: prefix);
        Ok(Some(digest))
    }

    async fn read_range(&self, offset: u64, count: usize) -> Result<Vec<u8>> {
        let mut file = self.open(false).await?;
        let size = file.metadata().await?.len();
        check_range(offset, count as u64, size)?;

        let mut buf = vec![0u8; count];
        let _ = file.seek(std::io::SeekFrom::Start(offset)).await?;
        let _ = file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn read(&self) -> Result<Vec<u8>> {
        let _ = self.metadata().await?;
        tokio::fs::read(&self.host_path)
            .await
            .map_err(|e| host_error(&self.name, e))
    }

    async fn write_at(&self, offset: u64, contents: &[u8]) -> Result<()> {
        let mut file = self.open(true).await?;
        let size = file.metadata().await?.len();
        check_range(offset, 0, size)?;

        let _ = file.seek(std::io::SeekFrom::Start(offset)).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        self.finish(&file).await?;

        let count = contents.len();
        let path = self.host_path.display().to_string();
        debug!("wrote {count} bytes at {offset} to {path}", count: count, offset: offset, path: path);
        Ok(())
    }

    async fn write(&self, contents: &[u8]) -> Result<()> {
        let permissions = self.metadata().await?.permissions();
        let dir = self
            .host_path
            .parent()
            .ok_or_else(|| Error::backend("file has no parent directory"))?;
        let tmp = self.root.tmp_path(dir);

        if let Err(e) = self.replace(contents, &tmp, permissions).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    let tmp = tmp.display().to_string();
                    let cleanup = cleanup.to_string();
                    warn!("failed to remove {tmp}: {cleanup}", tmp: tmp, cleanup: cleanup);
                }
            }
            return Err(e);
        }

        let count = contents.len();
        let path = self.host_path.display().to_string();
        debug!("replaced {path} with {count} bytes", path: path, count: count);
        Ok(())
    }

    async fn resize(&self, size: u64) -> Result<()> {
        let file = self.open(true).await?;
        file.set_len(size).await?;
        self.finish(&file).await?;

        let path = self.host_path.display().to_string();
        debug!("resized {path} to {size} bytes", path: path, size: size);
        Ok(())
    }
}
