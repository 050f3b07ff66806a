/// Convenience result type used across formwright.
pub type FormResult<T> = Result<T, FormError>;

/// Top-level error taxonomy used by the rendering core.
///
/// Most failures inside a render pass are contained and only logged (missing components,
/// failing middlewares, failing reactions). The variants here cover what does escape.
#[derive(thiserror::Error, Debug)]
pub enum FormError {
    /// Invalid user-provided schema or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A dotted path walked through a `null` or missing intermediate value.
    #[error("path traversal error: {0}")]
    PathTraversal(String),

    /// Errors while parsing or evaluating a reaction expression.
    #[error("expression error: {0}")]
    Expression(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from callbacks or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FormError {
    /// Build a [`FormError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FormError::PathTraversal`] value.
    pub fn path_traversal(msg: impl Into<String>) -> Self {
        Self::PathTraversal(msg.into())
    }

    /// Build a [`FormError::Expression`] value.
    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    /// Build a [`FormError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error came from walking a path through an absent intermediate.
    pub fn is_path_traversal(&self) -> bool {
        matches!(self, Self::PathTraversal(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
