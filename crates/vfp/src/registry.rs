// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Provider registration
//!
//! A host that does not know provider types at compile time looks them up
//! here by name, reads the template, and constructs them from a
//! [`ProviderConfig`].

use crate::argument::Argument;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::hostmount::HostProvider;
use crate::memory::MemoryProvider;
use crate::provider::{GenericInit, VirtualFileProvider};
use diagnostics::*;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// A provider whose concrete type has been erased
pub type BoxProvider = Box<dyn VirtualFileProvider>;

type InitFuture = Pin<Box<dyn Future<Output = Result<BoxProvider>> + Send>>;

/// Describes how to construct one provider type
#[derive(Clone, Copy)]
pub struct ProviderFactory {
    /// Provider name (unique identifier)
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Ordered argument prototypes
    pub template: fn() -> Vec<Argument>,
    /// Construct from filled-in arguments
    pub init: fn(Vec<Argument>) -> InitFuture,
}

fn init_boxed<P: GenericInit + 'static>(arguments: Vec<Argument>) -> InitFuture {
    Box::pin(async move {
        let provider = P::init(arguments).await?;
        Ok(Box::new(provider) as BoxProvider)
    })
}

impl ProviderFactory {
    /// Factory for a [`GenericInit`] provider type
    #[must_use]
    pub fn of<P: GenericInit + 'static>(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            template: P::template,
            init: init_boxed::<P>,
        }
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Named provider factories
#[derive(Debug, Default, Clone)]
pub struct Registry {
    factories: BTreeMap<&'static str, ProviderFactory>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `memory` and `hostmount` providers
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for factory in [
            ProviderFactory::of::<MemoryProvider>("memory", "Tree held in process memory"),
            ProviderFactory::of::<HostProvider>("hostmount", "Directory on the host filesystem"),
        ] {
            let _ = registry.factories.insert(factory.name, factory);
        }
        registry
    }

    pub fn register(&mut self, factory: ProviderFactory) -> Result<()> {
        if self.factories.contains_key(factory.name) {
            return Err(Error::config(format!(
                "provider '{}' is already registered",
                factory.name
            )));
        }
        let _ = self.factories.insert(factory.name, factory);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ProviderFactory> {
        self.factories
            .get(name)
            .ok_or_else(|| Error::config(format!("unknown provider '{}'", name)))
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// A fresh copy of the named provider's template
    pub fn template(&self, name: &str) -> Result<Vec<Argument>> {
        Ok((self.get(name)?.template)())
    }

    /// Construct the provider described by `config`
    pub async fn open(&self, config: &ProviderConfig) -> Result<BoxProvider> {
        let factory = self.get(&config.provider)?;
        let arguments = config.fill(&(factory.template)())?;
        let name = factory.name;
        debug!("opening provider {name}", name: name);
        (factory.init)(arguments).await
    }
}
