// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Typed configuration arguments
//!
//! A provider type declares an ordered template of arguments. A host clones
//! the template, fills in values, and hands the filled copy back to the
//! provider constructor (see [`crate::GenericInit`]). Every variant starts
//! out holding its example value, except [`PasswordArgument`], which starts
//! empty.

use crate::error::InvalidArgument;
use url::Url;

type ArgResult<T> = std::result::Result<T, InvalidArgument>;

/// Attributes shared by every argument variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentInfo {
    name: String,
    description: String,
    is_expert: bool,
}

impl ArgumentInfo {
    fn new(name: String, description: String, is_expert: bool) -> Self {
        Self {
            name,
            description,
            is_expert,
        }
    }

    /// Name, unique within a template
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable description of the argument
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// UI hint only: whether the argument should be hidden from casual users
    #[must_use]
    pub fn is_expert(&self) -> bool {
        self.is_expert
    }
}

/// A filesystem path argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathArgument {
    info: ArgumentInfo,
    path: String,
}

impl PathArgument {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        is_expert: bool,
        example: impl Into<String>,
    ) -> Self {
        Self {
            info: ArgumentInfo::new(name.into(), description.into(), is_expert),
            path: example.into(),
        }
    }

    #[must_use]
    pub fn info(&self) -> &ArgumentInfo {
        &self.info
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }
}

/// A URL argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlArgument {
    info: ArgumentInfo,
    url: Url,
}

impl UrlArgument {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        is_expert: bool,
        example: Url,
    ) -> Self {
        Self {
            info: ArgumentInfo::new(name.into(), description.into(), is_expert),
            url: example,
        }
    }

    #[must_use]
    pub fn info(&self) -> &ArgumentInfo {
        &self.info
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set(&mut self, url: Url) {
        self.url = url;
    }
}

/// An email address argument. The address is not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailArgument {
    info: ArgumentInfo,
    email: String,
}

impl EmailArgument {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        is_expert: bool,
        example: impl Into<String>,
    ) -> Self {
        Self {
            info: ArgumentInfo::new(name.into(), description.into(), is_expert),
            email: example.into(),
        }
    }

    #[must_use]
    pub fn info(&self) -> &ArgumentInfo {
        &self.info
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }
}

/// A single choice out of a fixed, ordered list of labels.
///
/// Invariant: `choice < choices.len()`, checked on construction and on
/// every [`ChoiceArgument::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceArgument {
    info: ArgumentInfo,
    choices: Vec<String>,
    choice: usize,
}

impl ChoiceArgument {
    #[track_caller]
    pub fn new<I, S>(
        name: impl Into<String>,
        description: impl Into<String>,
        is_expert: bool,
        choices: I,
        example: usize,
    ) -> ArgResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let info = ArgumentInfo::new(name.into(), description.into(), is_expert);
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        check_choice(&info, choices.len(), example)?;
        Ok(Self {
            info,
            choices,
            choice: example,
        })
    }

    /// Template constructor for a fixed choice list whose `example` is a
    /// valid index by construction.
    pub(crate) fn preset<const N: usize>(
        name: &str,
        description: &str,
        is_expert: bool,
        choices: [&str; N],
        example: usize,
    ) -> Self {
        debug_assert!(example < N);
        Self {
            info: ArgumentInfo::new(name.to_string(), description.to_string(), is_expert),
            choices: choices.iter().map(|c| (*c).to_string()).collect(),
            choice: example.min(N.saturating_sub(1)),
        }
    }

    #[must_use]
    pub fn info(&self) -> &ArgumentInfo {
        &self.info
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Index of the selected choice
    #[must_use]
    pub fn choice(&self) -> usize {
        self.choice
    }

    /// Label of the selected choice
    #[must_use]
    pub fn selected(&self) -> &str {
        &self.choices[self.choice]
    }

    /// Select a choice by index. Leaves the selection untouched on failure.
    #[track_caller]
    pub fn set(&mut self, choice: usize) -> ArgResult<()> {
        check_choice(&self.info, self.choices.len(), choice)?;
        self.choice = choice;
        Ok(())
    }

    /// Select a choice by its label
    #[track_caller]
    pub fn set_label(&mut self, label: &str) -> ArgResult<()> {
        match self.choices.iter().position(|c| c == label) {
            Some(index) => self.set(index),
            None => Err(InvalidArgument::new(
                self.info.name(),
                format!("unknown choice '{}'", label),
            )),
        }
    }
}

#[track_caller]
fn check_choice(info: &ArgumentInfo, len: usize, choice: usize) -> ArgResult<()> {
    if choice < len {
        Ok(())
    } else {
        Err(InvalidArgument::new(
            info.name(),
            format!("choice index {} out of range (0..{})", choice, len),
        ))
    }
}

/// A password argument. Never seeded with an example value.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordArgument {
    info: ArgumentInfo,
    password: String,
}

impl PasswordArgument {
    pub fn new(name: impl Into<String>, description: impl Into<String>, is_expert: bool) -> Self {
        Self {
            info: ArgumentInfo::new(name.into(), description.into(), is_expert),
            password: String::new(),
        }
    }

    #[must_use]
    pub fn info(&self) -> &ArgumentInfo {
        &self.info
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }
}

impl std::fmt::Debug for PasswordArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordArgument")
            .field("info", &self.info)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Discriminant of an [`Argument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    Path,
    Url,
    Email,
    Choice,
    Password,
}

impl std::fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ArgumentKind::Path => "path",
            ArgumentKind::Url => "url",
            ArgumentKind::Email => "email",
            ArgumentKind::Choice => "choice",
            ArgumentKind::Password => "password",
        };
        write!(f, "{}", s)
    }
}

/// One typed argument of a provider template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Path(PathArgument),
    Url(UrlArgument),
    Email(EmailArgument),
    Choice(ChoiceArgument),
    Password(PasswordArgument),
}

impl Argument {
    #[must_use]
    pub fn info(&self) -> &ArgumentInfo {
        match self {
            Argument::Path(a) => a.info(),
            Argument::Url(a) => a.info(),
            Argument::Email(a) => a.info(),
            Argument::Choice(a) => a.info(),
            Argument::Password(a) => a.info(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.info().name()
    }

    #[must_use]
    pub fn kind(&self) -> ArgumentKind {
        match self {
            Argument::Path(_) => ArgumentKind::Path,
            Argument::Url(_) => ArgumentKind::Url,
            Argument::Email(_) => ArgumentKind::Email,
            Argument::Choice(_) => ArgumentKind::Choice,
            Argument::Password(_) => ArgumentKind::Password,
        }
    }

    /// Set the value from its textual form.
    ///
    /// URLs are parsed; choices accept either a label or a decimal index.
    #[track_caller]
    pub fn set_from_str(&mut self, value: &str) -> ArgResult<()> {
        match self {
            Argument::Path(a) => a.set(value),
            Argument::Email(a) => a.set(value),
            Argument::Password(a) => a.set(value),
            Argument::Url(a) => {
                let url = Url::parse(value).map_err(|e| {
                    InvalidArgument::new(a.info().name(), format!("invalid URL '{}': {}", value, e))
                })?;
                a.set(url);
            }
            Argument::Choice(a) => {
                if a.choices().iter().any(|c| c == value) {
                    a.set_label(value)?;
                } else {
                    let index = value.parse::<usize>().map_err(|_| {
                        InvalidArgument::new(a.info().name(), format!("unknown choice '{}'", value))
                    })?;
                    a.set(index)?;
                }
            }
        }
        Ok(())
    }
}

impl From<PathArgument> for Argument {
    fn from(a: PathArgument) -> Self {
        Argument::Path(a)
    }
}

impl From<UrlArgument> for Argument {
    fn from(a: UrlArgument) -> Self {
        Argument::Url(a)
    }
}

impl From<EmailArgument> for Argument {
    fn from(a: EmailArgument) -> Self {
        Argument::Email(a)
    }
}

impl From<ChoiceArgument> for Argument {
    fn from(a: ChoiceArgument) -> Self {
        Argument::Choice(a)
    }
}

impl From<PasswordArgument> for Argument {
    fn from(a: PasswordArgument) -> Self {
        Argument::Password(a)
    }
}

/// Filled-in arguments whose shape has been checked against a template.
///
/// Providers use the positional accessors in their `init` to pull typed
/// values out in template order.
#[derive(Debug, Clone)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    /// Check that `arguments` has the same length as `template`, and the same
    /// name and variant at every position. Choice arguments must also offer
    /// the same choices in the same order.
    #[track_caller]
    pub fn checked(template: &[Argument], arguments: Vec<Argument>) -> ArgResult<Self> {
        if template.len() != arguments.len() {
            return Err(InvalidArgument::new(
                "arguments",
                format!(
                    "expected {} arguments, got {}",
                    template.len(),
                    arguments.len()
                ),
            ));
        }
        for (expected, actual) in template.iter().zip(&arguments) {
            if expected.name() != actual.name() {
                return Err(InvalidArgument::new(
                    expected.name(),
                    format!("found argument '{}' in its position", actual.name()),
                ));
            }
            if expected.kind() != actual.kind() {
                return Err(InvalidArgument::new(
                    expected.name(),
                    format!("expected a {} argument, got {}", expected.kind(), actual.kind()),
                ));
            }
            if let (Argument::Choice(expected), Argument::Choice(actual)) = (expected, actual) {
                if expected.choices() != actual.choices() {
                    return Err(InvalidArgument::new(
                        expected.info().name(),
                        format!(
                            "expected choices {:?}, got {:?}",
                            expected.choices(),
                            actual.choices()
                        ),
                    ));
                }
            }
        }
        Ok(Self(arguments))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[track_caller]
    fn at(&self, index: usize) -> ArgResult<&Argument> {
        self.0.get(index).ok_or_else(|| {
            InvalidArgument::new("arguments", format!("no argument at position {}", index))
        })
    }

    #[track_caller]
    fn mismatch(arg: &Argument, expected: ArgumentKind) -> InvalidArgument {
        InvalidArgument::new(
            arg.name(),
            format!("expected a {} argument, got {}", expected, arg.kind()),
        )
    }

    #[track_caller]
    pub fn path(&self, index: usize) -> ArgResult<&PathArgument> {
        match self.at(index)? {
            Argument::Path(a) => Ok(a),
            other => Err(Self::mismatch(other, ArgumentKind::Path)),
        }
    }

    #[track_caller]
    pub fn url(&self, index: usize) -> ArgResult<&UrlArgument> {
        match self.at(index)? {
            Argument::Url(a) => Ok(a),
            other => Err(Self::mismatch(other, ArgumentKind::Url)),
        }
    }

    #[track_caller]
    pub fn email(&self, index: usize) -> ArgResult<&EmailArgument> {
        match self.at(index)? {
            Argument::Email(a) => Ok(a),
            other => Err(Self::mismatch(other, ArgumentKind::Email)),
        }
    }

    #[track_caller]
    pub fn choice(&self, index: usize) -> ArgResult<&ChoiceArgument> {
        match self.at(index)? {
            Argument::Choice(a) => Ok(a),
            other => Err(Self::mismatch(other, ArgumentKind::Choice)),
        }
    }

    #[track_caller]
    pub fn password(&self, index: usize) -> ArgResult<&PasswordArgument> {
        match self.at(index)? {
            Argument::Password(a) => Ok(a),
            other => Err(Self::mismatch(other, ArgumentKind::Password)),
        }
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Argument> {
        self.0
    }
}
