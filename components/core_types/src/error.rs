//! Virtual-machine error type and error stages.
//!
//! A module can fail while being read, while being structurally verified,
//! while its references are linked, or while it executes. The stage is kept
//! on the error so the shell can decide how loudly to report it.

use std::fmt;

/// The stage at which a virtual-machine operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmErrorKind {
    /// Module bytes could not be read or parsed
    Load,
    /// Module failed structural verification
    Verify,
    /// A referenced symbol could not be resolved
    Link,
    /// Module execution failed (e.g. a definition conflict)
    Execution,
}

impl VmErrorKind {
    /// Error-name prefix used in rendered messages.
    pub fn as_str(self) -> &'static str {
        match self {
            VmErrorKind::Load => "LoadError",
            VmErrorKind::Verify => "VerifyError",
            VmErrorKind::Link => "LinkError",
            VmErrorKind::Execution => "ExecutionError",
        }
    }
}

impl fmt::Display for VmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virtual-machine error with the stage it occurred at and the chain of
/// module loads that led to it.
///
/// The `stack` grows outward: the innermost frame comes first, each
/// enclosing load appends one entry via [`VmError::with_frame`].
///
/// # Examples
///
/// ```
/// use core_types::{VmError, VmErrorKind};
///
/// let error = VmError::link("unresolvable symbol display.Stage referenced by TAG0")
///     .with_frame("while loading chunk display/core for symbol display.Stage");
///
/// assert_eq!(error.kind, VmErrorKind::Link);
/// assert_eq!(error.stack.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct VmError {
    /// Stage at which the failure occurred
    pub kind: VmErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Module-load chain at the time of the error, innermost first
    pub stack: Vec<String>,
}

impl VmError {
    /// Create an error of the given kind with an empty stack.
    pub fn new(kind: VmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Create a [`VmErrorKind::Load`] error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::new(VmErrorKind::Load, message)
    }

    /// Create a [`VmErrorKind::Verify`] error.
    pub fn verify(message: impl Into<String>) -> Self {
        Self::new(VmErrorKind::Verify, message)
    }

    /// Create a [`VmErrorKind::Link`] error.
    pub fn link(message: impl Into<String>) -> Self {
        Self::new(VmErrorKind::Link, message)
    }

    /// Create a [`VmErrorKind::Execution`] error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(VmErrorKind::Execution, message)
    }

    /// Append one frame to the load chain and return the error.
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for VmError {}
