// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Virtual file provider
//!
//! A uniform interface over hierarchical file storage. Callers walk a tree
//! of [`VirtualDirectory`] and [`VirtualFile`] handles starting at
//! [`VirtualFileProvider::root`], without knowing which backend serves it.
//! Provider types declare a typed argument template ([`GenericInit`]) so a
//! host can configure and construct them at runtime through a [`Registry`].
//!
//! Two providers ship with the crate: [`memory`], the reference
//! implementation, and [`hostmount`], which maps a host directory.

mod argument;
mod config;
mod entry_type;
mod error;
mod name;
mod provider;
mod registry;

pub mod hostmount;
pub mod memory;

#[cfg(test)]
mod tests;

pub use argument::{
    Argument, ArgumentInfo, ArgumentKind, Arguments, ChoiceArgument, EmailArgument,
    PasswordArgument, PathArgument, UrlArgument,
};
pub use config::ProviderConfig;
pub use entry_type::EntryType;
pub use error::{Error, ErrorKind, InvalidArgument, Result};
pub use hostmount::{Durability, HostProvider};
pub use memory::{MemoryOptions, MemoryProvider};
pub use name::{display_name, validate_name};
pub use provider::{
    DirHandle, Entry, FileHandle, GenericInit, SHA512_LEN, Sha512Digest, VirtualDirectory,
    VirtualFile, VirtualFileProvider,
};
pub use registry::{BoxProvider, ProviderFactory, Registry};

// Re-export so providers and hosts name the same URL type
pub use url::Url;
