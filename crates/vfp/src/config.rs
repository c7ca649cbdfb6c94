// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML description of a provider instance
//!
//! ```yaml
//! provider: hostmount
//! arguments:
//!   root: /srv/data
//!   durability: sync
//! ```

use crate::argument::Argument;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Which provider to construct, and the argument values to fill in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registered provider name
    pub provider: String,
    /// Argument values by argument name, in textual form
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            arguments: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid provider config: {}", e)))
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| Error::config(format!("cannot serialize provider config: {}", e)))
    }

    /// Copy `template` and apply the configured values by argument name.
    ///
    /// Arguments without a configured value keep their example value.
    /// A configured name that is not in the template is an error.
    pub fn fill(&self, template: &[Argument]) -> Result<Vec<Argument>> {
        let mut arguments = template.to_vec();
        for (name, value) in &self.arguments {
            let argument = arguments
                .iter_mut()
                .find(|a| a.name() == name)
                .ok_or_else(|| {
                    Error::invalid_argument(
                        name.as_str(),
                        format!("not an argument of provider '{}'", self.provider),
                    )
                })?;
            argument.set_from_str(value)?;
        }
        Ok(arguments)
    }
}
