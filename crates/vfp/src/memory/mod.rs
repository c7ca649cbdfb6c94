// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory provider
//!
//! The reference implementation of the provider contracts. The whole tree
//! lives behind one async mutex and every operation takes it exactly once,
//! so every operation (including `write_at`) is atomic. Handles carry only
//! a node id and name; a handle whose node was deleted fails with
//! [`crate::Error::NotFound`].

mod directory;
mod file;
mod state;

pub use directory::MemoryDirectory;
pub use file::MemoryFile;

use crate::argument::{Argument, Arguments, ChoiceArgument};
use crate::error::Result;
use crate::provider::{DirHandle, GenericInit, VirtualFileProvider};
use async_trait::async_trait;
use diagnostics::*;
use state::State;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Which optional file attributes the memory provider reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryOptions {
    /// Report `last_modified`
    pub track_timestamps: bool,
    /// Report `sha512`
    pub compute_digest: bool,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            track_timestamps: true,
            compute_digest: true,
        }
    }
}

pub(crate) struct Store {
    state: Mutex<State>,
    options: MemoryOptions,
}

impl Store {
    /// Sample under the state lock so commits are stamped in lock order.
    fn now(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// A provider whose tree lives entirely in memory
#[derive(Clone)]
pub struct MemoryProvider {
    store: Arc<Store>,
}

impl MemoryProvider {
    /// Create a provider with an empty root
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(MemoryOptions::default())
    }

    #[must_use]
    pub fn with_options(options: MemoryOptions) -> Self {
        Self {
            store: Arc::new(Store {
                state: Mutex::new(State::default()),
                options,
            }),
        }
    }

    #[must_use]
    pub fn options(&self) -> MemoryOptions {
        self.store.options
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileProvider for MemoryProvider {
    fn root(&self) -> DirHandle {
        DirHandle::new(MemoryDirectory::root(self.store.clone()))
    }
}

#[async_trait]
impl GenericInit for MemoryProvider {
    fn template() -> Vec<Argument> {
        vec![
            ChoiceArgument::preset(
                "timestamps",
                "Whether files report their last modification time",
                true,
                ["tracked", "untracked"],
                0,
            )
            .into(),
            ChoiceArgument::preset(
                "digest",
                "Whether files report a SHA-512 digest of their contents",
                true,
                ["sha512", "none"],
                0,
            )
            .into(),
        ]
    }

    async fn init(arguments: Vec<Argument>) -> Result<Self> {
        let args = Arguments::checked(&Self::template(), arguments)?;
        let options = MemoryOptions {
            track_timestamps: args.choice(0)?.choice() == 0,
            compute_digest: args.choice(1)?.choice() == 0,
        };
        let timestamps = args.choice(0)?.selected().to_string();
        let digest = args.choice(1)?.selected().to_string();
        info!("memory provider ready: timestamps {timestamps}, digest {digest}", timestamps: timestamps, digest: digest);
        Ok(Self::with_options(options))
    }
}
