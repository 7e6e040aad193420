//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{ConfigError, GateError};

/// Foundation error enum for the Copyforge workspace.
///
/// # Examples
///
/// ```
/// use copyforge_error::{CopyforgeError, GateError, GateErrorKind};
///
/// let gate_err = GateError::new(GateErrorKind::UnknownFeature("time_machine".into()));
/// let err: CopyforgeError = gate_err.into();
/// assert!(format!("{}", err).contains("Gate Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CopyforgeErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gate invariant or lookup error
    #[from(GateError)]
    Gate(GateError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Copyforge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use copyforge_error::{ConfigError, CopyforgeResult};
///
/// fn might_fail() -> CopyforgeResult<()> {
///     Err(ConfigError::new("missing tier: pro_plus"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("ok"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Copyforge Error: {}", _0)]
pub struct CopyforgeError(Box<CopyforgeErrorKind>);

impl CopyforgeError {
    /// Create a new error from a kind.
    pub fn new(kind: CopyforgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CopyforgeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CopyforgeErrorKind
impl<T> From<T> for CopyforgeError
where
    T: Into<CopyforgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Copyforge operations.
///
/// # Examples
///
/// ```
/// use copyforge_error::{CopyforgeResult, GateError, GateErrorKind};
///
/// fn resolve() -> CopyforgeResult<String> {
///     Err(GateError::new(GateErrorKind::UnknownTier("platinum".into())))?
/// }
/// ```
pub type CopyforgeResult<T> = std::result::Result<T, CopyforgeError>;
