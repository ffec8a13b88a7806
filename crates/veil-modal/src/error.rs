#![forbid(unsafe_code)]

//! Error type for every fallible modal operation.
//!
//! All errors are raised synchronously at the point of misuse and returned
//! to the caller unchanged; the engine never retries or degrades. The
//! registry and the DOM are left as they were before the failing call.

/// Errors from modal construction, lifecycle and setter calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    /// Another live modal already uses this identifier.
    #[error("duplicate modal identifier '{0}': identifiers must be unique")]
    DuplicateIdentifier(String),

    /// A custom class token does not match the class-name grammar.
    #[error("invalid custom class '{0}'")]
    InvalidClassName(String),

    /// A title was configured but the template has no `.modal-title p`.
    #[error("template has no title region: add a \"modal-title\" element with a <p> inside")]
    TemplateMissingTitleRegion,

    /// Content was configured but the template has no `.modal-content`.
    #[error("template has no content region: add a \"modal-content\" element")]
    TemplateMissingContentRegion,

    /// `set_title` on a modal whose markup has no `.modal-title p`.
    #[error("modal '{0}' has no \"modal-title\" element with a <p> inside")]
    MissingTitleRegion(String),

    /// `set_content` on a modal whose markup has no `.modal-content`.
    #[error("modal '{0}' has no \"modal-content\" element")]
    MissingContentRegion(String),

    /// A dynamically supplied identifier was not a string.
    #[error("modal identifier must be a string")]
    InvalidIdentifierType,

    /// A dynamically supplied option had the wrong type.
    #[error("invalid type for option '{key}': {reason}")]
    InvalidType {
        /// Option key (camelCase).
        key: String,
        /// What was expected.
        reason: String,
    },

    /// Options text could not be parsed as JSON.
    #[error("malformed options: {0}")]
    MalformedOptions(String),

    /// No live modal matches the key or identifier.
    #[error("no live modal '{0}'")]
    UnknownModal(String),

    /// The modal exists but its DOM has not been built yet.
    #[error("modal '{0}' is not materialized yet: the document is not ready")]
    NotMaterialized(String),
}

/// Convenience alias.
pub type Result<T, E = ModalError> = std::result::Result<T, E>;
