//! Errors for invariant violations.
//!
//! These indicate a caller bug (a UI path that should never have been
//! reachable), not a recoverable runtime condition. No-op conditions such as
//! undo on an empty stack are not errors and never appear here.

use uuid::Uuid;

/// Error returned when a model operation is called with arguments that break
/// one of the document invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// An element was created without a layer to own it.
    #[error("no active layer")]
    NoActiveLayer,
    /// A text element was created without `{content, family, size}`.
    #[error("text element requires content, family and size")]
    MissingTextProperties,
    /// A resize handle tag outside `nw|n|ne|w|e|sw|s|se`.
    #[error("invalid resize handle: {0}")]
    InvalidResizeHandle(String),
    /// The referenced element does not exist.
    #[error("element not found: {0}")]
    ElementNotFound(Uuid),
    /// The referenced layer does not exist.
    #[error("layer not found: {0}")]
    LayerNotFound(Uuid),
}
