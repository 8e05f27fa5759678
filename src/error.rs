use std::error::Error as StdError;

use thiserror::Error;

/// Message shared by every failure that means "this container cannot be
/// decrypted", regardless of which check rejected it.
pub const UNDECRYPTABLE_MSG: &str = "cannot decrypt: wrong password or corrupted file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee that the error is not, for
    /// example, due to a user error - merely that it cannot be confidently
    /// determined by the code.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input is not a container of the supported version: wrong magic, or
    /// shorter than the smallest possible container.
    FormatMismatch,
    /// Authentication failed due to an incorrect password, tampering or
    /// corruption. These causes are deliberately not distinguished.
    AuthenticationFailed,
    /// The operating system's secure random generator could not supply bytes.
    RandomSourceExhausted,
    /// The input file could not be read.
    InputUnavailable,
    /// The output file could not be created or written.
    OutputUnwritable,
    /// Password could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// AES-256-GCM refused to seal the payload.
    CipherFailure,
    /// Unexpected state reached within ciphervault logic.
    InternalInvariant,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct VaultError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl VaultError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The single error reported for any container that cannot be opened.
    ///
    /// `kind` must be `FormatMismatch` or `AuthenticationFailed`; the message
    /// is identical for both so callers cannot tell them apart by text.
    pub(crate) fn undecryptable(kind: ErrorKind) -> Self {
        debug_assert!(matches!(
            kind,
            ErrorKind::FormatMismatch | ErrorKind::AuthenticationFailed
        ));
        Self::with_kind(ErrorCategory::User, kind, UNDECRYPTABLE_MSG)
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True when the error means the input could not be decrypted, whether
    /// because it is not a container or because authentication failed.
    pub fn is_undecryptable(&self) -> bool {
        matches!(
            self.kind,
            Some(ErrorKind::FormatMismatch | ErrorKind::AuthenticationFailed)
        )
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_keeps_category_and_kind() {
        let err = VaultError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::RandomSourceExhausted,
            "no entropy",
        )
        .with_context("encryption failed");

        assert_eq!(err.category, ErrorCategory::Internal);
        assert_eq!(err.kind, Some(ErrorKind::RandomSourceExhausted));
        assert_eq!(err.message(), "encryption failed");
        assert_eq!(err.source_error().unwrap().to_string(), "no entropy");
    }

    #[test]
    fn test_undecryptable_messages_are_identical() {
        let format = VaultError::undecryptable(ErrorKind::FormatMismatch);
        let auth = VaultError::undecryptable(ErrorKind::AuthenticationFailed);

        assert_eq!(format.to_string(), auth.to_string());
        assert!(format.is_undecryptable());
        assert!(auth.is_undecryptable());
    }

    #[test]
    fn test_io_errors_are_not_undecryptable() {
        let err = VaultError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InputUnavailable,
            "failed to read",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(!err.is_undecryptable());
        assert!(err.source_error().is_some());

        let plain = VaultError::new(ErrorCategory::Internal, "oops");
        assert_eq!(plain.kind, None);
        assert!(!plain.is_undecryptable());
    }
}
