// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Provider contracts
//!
//! Every backend implements [`VirtualFile`], [`VirtualDirectory`] and
//! [`VirtualFileProvider`]. Handles are stateless references: each call
//! resolves the handle against the backing store, nothing is cached in the
//! handle itself.

use crate::EntryType;
use crate::argument::Argument;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

/// Length in bytes of a SHA-512 digest
pub const SHA512_LEN: usize = 64;

/// A raw SHA-512 digest
pub type Sha512Digest = [u8; SHA512_LEN];

/// A reference to a single file.
///
/// # Guarantees
///
/// - `read_range` and `read` are nullipotent and atomic: they return the
///   complete requested bytes or fail, never a short buffer.
/// - `write_at` is idempotent; its atomicity is backend-defined.
/// - `write` and `resize` are idempotent and atomic.
/// - Range violations fail with [`Error::OutOfBounds`], which is distinct
///   from I/O failures.
#[async_trait]
pub trait VirtualFile: Send + Sync {
    /// The file name
    fn name(&self) -> &[u8];

    /// Current size in bytes
    async fn size(&self) -> Result<u64>;

    /// Last modification as milliseconds since the Unix epoch, `None` when
    /// the backend does not track it.
    async fn last_modified(&self) -> Result<Option<u64>>;

    /// SHA-512 of the current contents, `None` when the backend does not
    /// provide one.
    async fn sha512(&self) -> Result<Option<Sha512Digest>>;

    /// Read `count` bytes starting at `offset`. Fails if `offset + count > size`.
    async fn read_range(&self, offset: u64, count: usize) -> Result<Vec<u8>>;

    /// Read the whole file
    async fn read(&self) -> Result<Vec<u8>>;

    /// Write `contents` starting at `offset`, growing the file if needed.
    /// Fails if `offset > size`.
    async fn write_at(&self, offset: u64, contents: &[u8]) -> Result<()>;

    /// Replace the whole contents
    async fn write(&self, contents: &[u8]) -> Result<()>;

    /// Truncate, or extend with zero bytes, to exactly `size` bytes
    async fn resize(&self, size: u64) -> Result<()>;
}

/// A reference to a directory.
///
/// # Guarantees
///
/// - `list` is nullipotent and returns a snapshot.
/// - `create_file` / `create_directory` are idempotent and atomic: an
///   existing entry of the same kind is returned as is. An existing entry of
///   the other kind fails with [`Error::KindConflict`].
/// - `delete` is idempotent and atomic. Deleting a missing name succeeds;
///   deleting a directory removes its whole subtree.
#[async_trait]
pub trait VirtualDirectory: Send + Sync {
    /// The directory name, `None` for the root
    fn name(&self) -> Option<&[u8]>;

    async fn list(&self) -> Result<BTreeMap<Vec<u8>, Entry>>;

    async fn create_file(&self, name: &[u8]) -> Result<FileHandle>;

    async fn create_directory(&self, name: &[u8]) -> Result<DirHandle>;

    async fn delete(&self, name: &[u8]) -> Result<()>;
}

/// A file tree with a single root
pub trait VirtualFileProvider: Send + Sync {
    /// The root directory. Never performs I/O.
    fn root(&self) -> DirHandle;
}

/// Construction of a provider from a typed argument template.
///
/// A host reads [`GenericInit::template`], fills in a copy and passes it to
/// [`GenericInit::init`]. `init` fails when the arguments do not match the
/// template's shape or when a value is unusable for the provider.
#[async_trait]
pub trait GenericInit: VirtualFileProvider + Sized {
    /// Ordered argument prototypes
    fn template() -> Vec<Argument>;

    async fn init(arguments: Vec<Argument>) -> Result<Self>;
}

/// A handle for a file reference
#[derive(Clone)]
pub struct FileHandle(Arc<dyn VirtualFile>);

/// A handle for a directory reference
#[derive(Clone)]
pub struct DirHandle(Arc<dyn VirtualDirectory>);

impl FileHandle {
    pub fn new<F: VirtualFile + 'static>(file: F) -> Self {
        Self(Arc::new(file))
    }
}

impl DirHandle {
    pub fn new<D: VirtualDirectory + 'static>(dir: D) -> Self {
        Self(Arc::new(dir))
    }
}

impl Deref for FileHandle {
    type Target = dyn VirtualFile;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl Deref for DirHandle {
    type Target = dyn VirtualDirectory;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(file {})", crate::display_name(self.name()))
    }
}

impl std::fmt::Debug for DirHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "(directory {})", crate::display_name(name)),
            None => write!(f, "(root)"),
        }
    }
}

/// A named child in a directory listing
#[derive(Clone, Debug)]
pub enum Entry {
    File(FileHandle),
    Directory(DirHandle),
}

impl Entry {
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        match self {
            Entry::File(_) => EntryType::File,
            Entry::Directory(_) => EntryType::Directory,
        }
    }

    pub fn as_file(&self) -> Result<FileHandle> {
        match self {
            Entry::File(f) => Ok(f.clone()),
            Entry::Directory(d) => Err(Error::kind_conflict(
                d.name().unwrap_or_default(),
                EntryType::Directory,
            )),
        }
    }

    pub fn as_dir(&self) -> Result<DirHandle> {
        match self {
            Entry::Directory(d) => Ok(d.clone()),
            Entry::File(f) => Err(Error::kind_conflict(f.name(), EntryType::File)),
        }
    }
}
