//! Error types for the glaurung-nav view navigation controller.
//!
//! Every failure in this crate is local and recoverable: a navigation that
//! fails leaves the frame exactly as it was before the call, and the error is
//! handed back to the caller instead of aborting.

use thiserror::Error;

/// Main error type for navigation, history and search operations.
#[derive(Debug, Error)]
pub enum NavError {
    /// No rendering applies to the document, or its factory failed
    #[error("Unsupported view type: {0}")]
    UnsupportedViewType(String),

    /// The target surface declined the requested offset
    #[error("Navigation to {offset:#x} rejected by view '{view_type}'")]
    NavigationRejected { view_type: String, offset: u64 },

    /// Back/forward with nothing to pop. `ViewFrame::back` and `forward`
    /// report this as `Ok(false)`; see [`NavError::require_history_step`].
    #[error("History is empty")]
    EmptyHistory,

    /// The progress callback asked the search to stop
    #[error("Search cancelled")]
    SearchCancelled,

    /// Address expression could not be resolved
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// The current view type cannot build the named extended view
    #[error("Extended view unavailable: {0}")]
    ExtendedViewUnavailable(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NavError {
    /// True when the error means "nothing happened" rather than a real failure.
    pub fn is_no_op(&self) -> bool {
        matches!(self, NavError::EmptyHistory)
    }

    /// Turn the `Ok(false)` of a back/forward step into `EmptyHistory`, for
    /// hosts that route every outcome through one error path.
    pub fn require_history_step(step: Result<bool>) -> Result<()> {
        match step? {
            true => Ok(()),
            false => Err(NavError::EmptyHistory),
        }
    }
}

impl From<serde_json::Error> for NavError {
    fn from(err: serde_json::Error) -> Self {
        NavError::Serialization(err.to_string())
    }
}

/// Result type alias for navigation operations
pub type Result<T> = std::result::Result<T, NavError>;
