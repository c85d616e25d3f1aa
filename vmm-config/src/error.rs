use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a single resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A required flag was not found anywhere in the invocation.
    #[error("missing required flag {flag} in invocation: {invocation}")]
    MissingRequiredValue {
        flag: &'static str,
        invocation: String,
    },

    /// A flag was the last token, with no value after it.
    #[error("flag {flag} is not followed by a value")]
    MissingFollowingToken { flag: &'static str },

    /// The value token does not have the shape the flag expects.
    #[error("malformed value for {flag}: {value}")]
    MalformedValue { flag: &'static str, value: String },

    /// The kernel image path could not be probed.
    #[error("kernel path {} is not accessible, invocation: {invocation}", path.display())]
    PathNotFound { path: PathBuf, invocation: String },

    /// A numeric value is outside its allowed bounds.
    #[error("value {value} for {flag} is out of range [{min}, {max}]")]
    InvalidRange {
        flag: &'static str,
        value: String,
        min: u64,
        max: u64,
    },
}

/// Payload-free view of [`ResolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredValue,
    MissingFollowingToken,
    MalformedValue,
    PathNotFound,
    InvalidRange,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::MissingRequiredValue { .. } => ErrorKind::MissingRequiredValue,
            ResolveError::MissingFollowingToken { .. } => ErrorKind::MissingFollowingToken,
            ResolveError::MalformedValue { .. } => ErrorKind::MalformedValue,
            ResolveError::PathNotFound { .. } => ErrorKind::PathNotFound,
            ResolveError::InvalidRange { .. } => ErrorKind::InvalidRange,
        }
    }
}

/// The configuration fragment an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigDomain {
    Kernel,
    Memory,
    Vcpu,
}

impl fmt::Display for ConfigDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDomain::Kernel => write!(f, "kernel"),
            ConfigDomain::Memory => write!(f, "memory"),
            ConfigDomain::Vcpu => write!(f, "vcpu"),
        }
    }
}

/// A resolver failure annotated with the domain that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {domain} configuration")]
pub struct ConfigError {
    domain: ConfigDomain,
    #[source]
    source: ResolveError,
}

impl ConfigError {
    pub fn new(domain: ConfigDomain, source: ResolveError) -> Self {
        Self { domain, source }
    }

    pub fn domain(&self) -> ConfigDomain {
        self.domain
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn resolve_error(&self) -> &ResolveError {
        &self.source
    }
}

/// Dedicated [`Result`](https://doc.rust-lang.org/std/result/) type.
pub type Result<T> = std::result::Result<T, ConfigError>;
