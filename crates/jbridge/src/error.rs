//! Error types for jbridge

use jbridge_sys::jint;

/// Result type for boundary operations
pub type JniResult<T> = Result<T, JniError>;

/// Errors surfaced by the binding layer.
///
/// Lookup misses on the "try" resolver forms are `None`, not errors. The
/// variants here cover everything that is recoverable at the call site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JniError {
    /// Class lookup failed
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Field lookup failed
    #[error("Field not found: {name} {signature}")]
    FieldNotFound {
        /// Field name
        name: String,
        /// Field signature
        signature: String,
    },

    /// Method lookup failed
    #[error("Method not found: {name}{signature}")]
    MethodNotFound {
        /// Method name
        name: String,
        /// Method signature
        signature: String,
    },

    /// A descriptor builder rejected its input
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A type or method signature string could not be parsed
    #[error("Invalid signature '{signature}' at offset {offset}: {reason}")]
    InvalidSignature {
        /// The input that failed to parse
        signature: String,
        /// Byte offset of the failure
        offset: usize,
        /// What was wrong
        reason: String,
    },

    /// No VM handle has been captured by the load hook
    #[error("No VM registered")]
    VmNotRegistered,

    /// Attaching the current thread failed
    #[error("Failed to attach current thread (status {0})")]
    AttachFailed(jint),

    /// Detaching the current thread failed
    #[error("Failed to detach current thread (status {0})")]
    DetachFailed(jint),

    /// An environment scope is already active on this thread
    #[error("An environment is already active on this thread")]
    ContextInUse,

    /// The runtime has a pending exception
    #[error("Exception pending in the managed runtime")]
    JavaException,

    /// The runtime refused to allocate a reference, array or string
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// Critical pinning of an array failed
    #[error("Failed to pin array")]
    PinFailed,

    /// Array index or range out of bounds
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// First offending index
        index: usize,
        /// Array length
        len: usize,
    },

    /// RegisterNatives/UnregisterNatives returned an error status
    #[error("Native registration failed for {class} (status {status})")]
    RegisterFailed {
        /// Class the natives were registered against
        class: String,
        /// Status returned by the runtime
        status: jint,
    },

    /// String data could not be converted between encodings
    #[error("String conversion failed: {0}")]
    StringConversion(String),

    /// The runtime's shared library could not be loaded
    #[error("Failed to load runtime library: {0}")]
    LibraryLoad(String),

    /// VM creation or destruction failed
    #[error("VM operation failed (status {0})")]
    VmFailed(jint),

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl From<String> for JniError {
    fn from(s: String) -> Self {
        JniError::Other(s)
    }
}

impl From<&str> for JniError {
    fn from(s: &str) -> Self {
        JniError::Other(s.to_string())
    }
}

impl From<std::ffi::NulError> for JniError {
    fn from(e: std::ffi::NulError) -> Self {
        JniError::StringConversion(format!("interior NUL at byte {}", e.nul_position()))
    }
}
