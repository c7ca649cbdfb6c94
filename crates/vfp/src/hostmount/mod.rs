// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Hostmount -- a host directory as a provider
//!
//! The provider root maps to a configured host directory. Handles are host
//! paths, re-examined on every call. Whole-file writes go through a
//! temporary sibling that is renamed over the target, and directory deletes
//! detach the directory with a rename before removing it, so both appear
//! instantaneous to other observers. Temporary siblings are never listed.

mod directory;
mod file;


pub use directory::HostDirectory;
pub use file::HostFile;

use crate::argument::{Argument, Arguments, ChoiceArgument, PathArgument};
use crate::error::{Error, Result};
use crate::provider::{DirHandle, GenericInit, VirtualFileProvider};
use async_trait::async_trait;
use diagnostics::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of transient entries created by atomic replace and delete
pub(crate) const TMP_PREFIX: &[u8] = b".vfp-tmp-";

/// When hostmount forces data to stable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Leave flushing to the host
    Buffered,
    /// `fsync` file data before a write returns
    Sync,
}

pub(crate) struct HostRoot {
    path: PathBuf,
    durability: Durability,
}

impl HostRoot {
    fn tmp_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "{}{}",
            String::from_utf8_lossy(TMP_PREFIX),
            uuid7::uuid7()
        ))
    }
}

/// A provider backed by a host directory
#[derive(Clone)]
pub struct HostProvider {
    root: Arc<HostRoot>,
}

impl HostProvider {
    /// Create a provider rooted at `root`, which must be an existing directory.
    pub fn new(root: PathBuf, durability: Durability) -> Result<Self> {
        let canonical = root.canonicalize().map_err(|e| {
            Error::invalid_argument(
                "root",
                format!("'{}' cannot be resolved: {}", root.display(), e),
            )
        })?;

        if !canonical.is_dir() {
            return Err(Error::invalid_argument(
                "root",
                format!("'{}' is not a directory", canonical.display()),
            ));
        }

        Ok(Self {
            root: Arc::new(HostRoot {
                path: canonical,
                durability,
            }),
        })
    }

    /// The host directory the root maps to
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root.path
    }

    #[must_use]
    pub fn durability(&self) -> Durability {
        self.root.durability
    }
}

impl VirtualFileProvider for HostProvider {
    fn root(&self) -> DirHandle {
        DirHandle::new(HostDirectory::root(self.root.clone()))
    }
}

#[async_trait]
impl GenericInit for HostProvider {
    fn template() -> Vec<Argument> {
        vec![
            PathArgument::new(
                "root",
                "Existing host directory that becomes the provider root",
                false,
                "/srv/vfp",
            )
            .into(),
            ChoiceArgument::preset(
                "durability",
                "Whether writes are synced to stable storage before returning",
                true,
                ["buffered", "sync"],
                0,
            )
            .into(),
        ]
    }

    async fn init(arguments: Vec<Argument>) -> Result<Self> {
        let args = Arguments::checked(&Self::template(), arguments)?;
        let durability = match args.choice(1)?.choice() {
            0 => Durability::Buffered,
            1 => Durability::Sync,
            n => {
                return Err(Error::invalid_argument(
                    "durability",
                    format!("choice index {} out of range", n),
                ));
            }
        };
        let provider = Self::new(PathBuf::from(args.path(0)?.path()), durability)?;

        let root = provider.root_path().display().to_string();
        info!("hostmount provider ready at {root}", root: root);
        Ok(provider)
    }
}

#[cfg(unix)]
pub(crate) fn name_to_os(name: &[u8]) -> Result<&OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Ok(OsStr::from_bytes(name))
}

#[cfg(not(unix))]
pub(crate) fn name_to_os(name: &[u8]) -> Result<&OsStr> {
    std::str::from_utf8(name)
        .map(OsStr::new)
        .map_err(|_| Error::invalid_name(name))
}

#[cfg(unix)]
pub(crate) fn os_to_name(name: &OsStr) -> Option<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;
    Some(name.as_bytes().to_vec())
}

#[cfg(not(unix))]
pub(crate) fn os_to_name(name: &OsStr) -> Option<Vec<u8>> {
    name.to_str().map(|s| s.as_bytes().to_vec())
}

/// Map a host error, turning "no such file" into [`Error::NotFound`] for `name`.
pub(crate) fn host_error(name: &[u8], err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::not_found(name)
    } else {
        Error::Io(err)
    }
}
