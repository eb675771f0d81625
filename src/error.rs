//! Error types for pre-flight validation
//!
//! Two families live here:
//! - [`ValidationError`] / [`ValidationErrors`]: problems found in a plan or
//!   on the network. These are the *output* of validation and are collected,
//!   never propagated with `?`.
//! - [`Error`]: operational failures of the primitives the validator relies on
//!   (reading a key, spawning `ssh`, parsing a certificate). Entry points turn
//!   these into validation errors with context.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Operational error raised by SSH and PKI primitives
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading a file from disk failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Private key could not be parsed
    #[error("invalid private key: {0}")]
    KeyParse(String),

    /// Private key is protected by a passphrase
    #[error("private key {path} is protected by a passphrase")]
    EncryptedKey {
        /// Path of the encrypted key
        path: PathBuf,
    },

    /// An external command failed or exited non-zero
    #[error("command failed: {command} - {message}")]
    Command {
        /// The command that failed
        command: String,
        /// Error output or spawn failure
        message: String,
    },

    /// An operation did not complete within its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Certificate inspection failed
    #[error("pki error: {0}")]
    Pki(String),
}

impl Error {
    /// Create an I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a key parse error with the given message
    pub fn key_parse(msg: impl Into<String>) -> Self {
        Self::KeyParse(msg.into())
    }

    /// Create a command error
    pub fn command(command: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: msg.into(),
        }
    }

    /// Create a PKI error with the given message
    pub fn pki(msg: impl Into<String>) -> Self {
        Self::Pki(msg.into())
    }
}

/// A single problem found during validation
///
/// The variant names the category of problem; the payload is the
/// human-readable diagnostic shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty
    #[error("{0}")]
    MissingField(String),

    /// A value does not parse (IP, CIDR, duration, path, address pattern)
    #[error("{0}")]
    InvalidFormat(String),

    /// Node topology does not add up
    #[error("{0}")]
    CountMismatch(String),

    /// Two options that cannot be combined were both set
    #[error("{0}")]
    MutualExclusion(String),

    /// The same entry appears more than once
    #[error("{0}")]
    DuplicateEntry(String),

    /// A node could not be reached over SSH
    #[error("{0}")]
    Connectivity(String),

    /// The SSH private key is encrypted, unreadable, or malformed
    #[error("{0}")]
    KeyFormat(String),

    /// A cluster certificate is missing or invalid
    #[error("{0}")]
    Certificate(String),
}

impl ValidationError {
    /// Create a missing-field error
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingField(msg.into())
    }

    /// Create an invalid-format error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a count-mismatch error
    pub fn count_mismatch(msg: impl Into<String>) -> Self {
        Self::CountMismatch(msg.into())
    }

    /// Create a mutual-exclusion error
    pub fn exclusive(msg: impl Into<String>) -> Self {
        Self::MutualExclusion(msg.into())
    }

    /// Create a duplicate-entry error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::DuplicateEntry(msg.into())
    }

    /// Create a connectivity error
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    /// Create a key-format error
    pub fn key_format(msg: impl Into<String>) -> Self {
        Self::KeyFormat(msg.into())
    }

    /// Create a certificate error
    pub fn certificate(msg: impl Into<String>) -> Self {
        Self::Certificate(msg.into())
    }

    /// The diagnostic text
    pub fn message(&self) -> &str {
        match self {
            Self::MissingField(m)
            | Self::InvalidFormat(m)
            | Self::CountMismatch(m)
            | Self::MutualExclusion(m)
            | Self::DuplicateEntry(m)
            | Self::Connectivity(m)
            | Self::KeyFormat(m)
            | Self::Certificate(m) => m,
        }
    }

    fn message_mut(&mut self) -> &mut String {
        match self {
            Self::MissingField(m)
            | Self::InvalidFormat(m)
            | Self::CountMismatch(m)
            | Self::MutualExclusion(m)
            | Self::DuplicateEntry(m)
            | Self::Connectivity(m)
            | Self::KeyFormat(m)
            | Self::Certificate(m) => m,
        }
    }

    /// Rewrite the message as `"{label}: {message}"`, keeping the category
    pub fn with_prefix(mut self, label: &str) -> Self {
        let message = self.message_mut();
        *message = format!("{}: {}", label, message);
        self
    }
}

/// All problems found by one validation call, in the order checks ran
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Wrap a list of errors
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    /// The collected errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no errors were collected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the collected errors
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Consume into the underlying list
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
