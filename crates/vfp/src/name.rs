// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Entry names are raw bytes. Nothing here assumes a text encoding except
//! [`display_name`], which exists only for messages.

use crate::error::{Error, Result};
use std::borrow::Cow;

/// Render a raw name for log and error messages
#[must_use]
pub fn display_name(name: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(name)
}

/// Reject names that cannot denote a single child of a directory.
pub fn validate_name(name: &[u8]) -> Result<()> {
    if name.is_empty() || name == b"." || name == b".." || name.contains(&b'/') || name.contains(&0)
    {
        return Err(Error::invalid_name(name));
    }
    Ok(())
}
