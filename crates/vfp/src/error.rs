// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::EntryType;
use crate::name::display_name;
use std::panic::Location;

pub type Result<T> = std::result::Result<T, Error>;

/// An argument failed validation, either while being set or while a
/// provider was being constructed from a filled-in template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument '{name}': {description}")]
pub struct InvalidArgument {
    /// Name of the offending argument
    pub name: String,
    /// Human readable description of the problem
    pub description: String,
    /// Call site that raised the error
    pub location: &'static Location<'static>,
}

impl InvalidArgument {
    #[track_caller]
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location: Location::caller(),
        }
    }
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied an invalid argument or name; fix the input and retry
    Argument,
    /// Offset/count violated the size precondition of a read or write
    Bounds,
    /// An entry of the other kind already exists under the requested name
    Conflict,
    /// The backing store could not complete the request
    Io,
    /// Provider configuration could not be loaded or resolved
    Config,
}

/// Represents errors that can occur in provider operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    #[error("Invalid entry name: {}", display_name(.0))]
    InvalidName(Vec<u8>),

    #[error("Out of bounds: offset {offset}, count {count}, size {size}")]
    OutOfBounds { offset: u64, count: u64, size: u64 },

    #[error("Entry already exists as a {existing}: {}", display_name(.name))]
    KindConflict { name: Vec<u8>, existing: EntryType },

    #[error("Entry not found: {}", display_name(.0))]
    NotFound(Vec<u8>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    #[track_caller]
    pub fn invalid_argument<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Error::InvalidArgument(InvalidArgument::new(name, description))
    }

    pub fn invalid_name<B: AsRef<[u8]>>(name: B) -> Self {
        Error::InvalidName(name.as_ref().to_vec())
    }

    pub fn out_of_bounds(offset: u64, count: u64, size: u64) -> Self {
        Error::OutOfBounds {
            offset,
            count,
            size,
        }
    }

    pub fn kind_conflict<B: AsRef<[u8]>>(name: B, existing: EntryType) -> Self {
        Error::KindConflict {
            name: name.as_ref().to_vec(),
            existing,
        }
    }

    pub fn not_found<B: AsRef<[u8]>>(name: B) -> Self {
        Error::NotFound(name.as_ref().to_vec())
    }

    pub fn backend<S: Into<String>>(message: S) -> Self {
        Error::Backend(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Which class of the error taxonomy this error belongs to
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) | Error::InvalidName(_) => ErrorKind::Argument,
            Error::OutOfBounds { .. } => ErrorKind::Bounds,
            Error::KindConflict { .. } => ErrorKind::Conflict,
            Error::NotFound(_) | Error::Io(_) | Error::Backend(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

/// Fails with [`Error::OutOfBounds`] unless `offset + count <= size`.
pub(crate) fn check_range(offset: u64, count: u64, size: u64) -> Result<()> {
    match offset.checked_add(count) {
        Some(end) if end <= size => Ok(()),
        _ => Err(Error::out_of_bounds(offset, count, size)),
    }
}
