//! Gate error types.

/// Gate error conditions.
///
/// These cover lookup failures and table-validation defects. Quota and tier
/// denials are not errors; they are structured deny decisions returned by
/// the gate itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GateErrorKind {
    /// Feature id not present in the static feature table
    #[display("Unknown feature '{}'", _0)]
    UnknownFeature(String),
    /// Category not present in the static tier table
    #[display("Unknown category '{}'", _0)]
    UnknownCategory(String),
    /// Tier name outside the closed tier set
    #[display("Unknown tier '{}'", _0)]
    UnknownTier(String),
    /// Principal id not present in the store
    #[display("Principal '{}' not found", _0)]
    PrincipalNotFound(String),
    /// Static table failed validation
    #[display("Tier table validation failed: {}", _0)]
    Validation(String),
}

/// Gate error with source location tracking.
///
/// # Examples
///
/// ```
/// use copyforge_error::{GateError, GateErrorKind};
///
/// let err = GateError::new(GateErrorKind::UnknownFeature("time_machine".into()));
/// assert!(format!("{}", err).contains("Unknown feature"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gate Error: {} at line {} in {}", kind, line, file)]
pub struct GateError {
    /// The kind of error that occurred
    pub kind: GateErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GateError {
    /// Create a new GateError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GateErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
