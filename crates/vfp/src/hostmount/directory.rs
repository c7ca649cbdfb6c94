// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::file::HostFile;
use super::{HostRoot, TMP_PREFIX, host_error, name_to_os, os_to_name};
use crate::EntryType;
use crate::error::{Error, Result};
use crate::name::{display_name, validate_name};
use crate::provider::{DirHandle, Entry, FileHandle, VirtualDirectory};
use async_trait::async_trait;
use diagnostics::*;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

/// A directory backed by a host filesystem directory.
///
/// `list` maps to `read_dir`, `create_*` create host entries, and `delete`
/// removes them (recursively for directories).
///
/// Names starting with `.vfp-tmp-` are reserved for transient entries: they
/// are never listed, and creating or deleting them fails with
/// [`Error::InvalidName`].
pub struct HostDirectory {
    root: Arc<HostRoot>,
    host_path: PathBuf,
    name: Option<Vec<u8>>,
}

impl HostDirectory {
    pub(super) fn root(root: Arc<HostRoot>) -> Self {
        let host_path = root.path.clone();
        Self {
            root,
            host_path,
            name: None,
        }
    }

    /// Absolute host path of this directory
    #[must_use]
    pub fn host_path(&self) -> &PathBuf {
        &self.host_path
    }

    fn name_bytes(&self) -> &[u8] {
        self.name.as_deref().unwrap_or_default()
    }

    fn child_path(&self, name: &[u8]) -> Result<PathBuf> {
        validate_name(name)?;
        if name.starts_with(TMP_PREFIX) {
            return Err(Error::invalid_name(name));
        }
        Ok(self.host_path.join(name_to_os(name)?))
    }

    fn file(&self, host_path: PathBuf, name: Vec<u8>) -> FileHandle {
        FileHandle::new(HostFile::new(self.root.clone(), host_path, name))
    }

    fn dir(&self, host_path: PathBuf, name: Vec<u8>) -> DirHandle {
        DirHandle::new(Self {
            root: self.root.clone(),
            host_path,
            name: Some(name),
        })
    }

    /// Fail with `NotFound` unless this directory still exists on the host
    async fn require_dir(&self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.host_path)
            .await
            .map_err(|e| host_error(self.name_bytes(), e))?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(Error::kind_conflict(self.name_bytes(), EntryType::File))
        }
    }

    async fn kind_of(&self, name: &[u8], path: &PathBuf) -> Result<EntryType> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| host_error(name, e))?;
        Ok(if metadata.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        })
    }
}

#[async_trait]
impl VirtualDirectory for HostDirectory {
    fn name(&self) -> Option<&[u8]> {
        self.name.as_deref()
    }

    async fn list(&self) -> Result<BTreeMap<Vec<u8>, Entry>> {
        let mut read_dir = tokio::fs::read_dir(&self.host_path)
            .await
            .map_err(|e| host_error(self.name_bytes(), e))?;

        let mut listing = BTreeMap::new();
        while let Some(dirent) = read_dir.next_entry().await? {
            let Some(name) = os_to_name(&dirent.file_name()) else {
                let path = dirent.path().display().to_string();
                warn!("skipping entry with unrepresentable name {path}", path: path);
                continue;
            };
            if name.starts_with(TMP_PREFIX) {
                continue;
            }

            // Follows symlinks; dangling links and special files are not listed.
            let metadata = match tokio::fs::metadata(dirent.path()).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let entry = if metadata.is_dir() {
                Entry::Directory(self.dir(dirent.path(), name.clone()))
            } else if metadata.is_file() {
                Entry::File(self.file(dirent.path(), name.clone()))
            } else {
                continue;
            };
            let _ = listing.insert(name, entry);
        }

        // A delete may have detached this directory mid-scan; report that
        // rather than a partial listing.
        self.require_dir().await?;
        Ok(listing)
    }

    async fn create_file(&self, name: &[u8]) -> Result<FileHandle> {
        let path = self.child_path(name)?;
        self.require_dir().await?;

        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => {
                let shown = display_name(name).to_string();
                debug!("created file {shown}", shown: shown);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if self.kind_of(name, &path).await? == EntryType::Directory {
                    return Err(Error::kind_conflict(name, EntryType::Directory));
                }
            }
            Err(e) => return Err(host_error(self.name_bytes(), e)),
        }
        Ok(self.file(path, name.to_vec()))
    }

    async fn create_directory(&self, name: &[u8]) -> Result<DirHandle> {
        let path = self.child_path(name)?;
        self.require_dir().await?;

        match tokio::fs::create_dir(&path).await {
            Ok(()) => {
                let shown = display_name(name).to_string();
                debug!("created directory {shown}", shown: shown);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if self.kind_of(name, &path).await? == EntryType::File {
                    return Err(Error::kind_conflict(name, EntryType::File));
                }
            }
            Err(e) => return Err(host_error(self.name_bytes(), e)),
        }
        Ok(self.dir(path, name.to_vec()))
    }

    async fn delete(&self, name: &[u8]) -> Result<()> {
        let path = self.child_path(name)?;
        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let shown = display_name(name).to_string();
        if metadata.is_dir() {
            // Detach first so the subtree disappears in one step.
            let detached = self.root.tmp_path(&self.host_path);
            match tokio::fs::rename(&path, &detached).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            }
            if let Err(e) = tokio::fs::remove_dir_all(&detached).await {
                let detached = detached.display().to_string();
                let error = e.to_string();
                warn!("deleted {shown} but failed to reclaim {detached}: {error}", shown: shown, detached: detached, error: error);
                return Ok(());
            }
        } else {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        debug!("deleted {shown}", shown: shown);
        Ok(())
    }
}
