use thiserror::Error;

/// Failure to turn one source document into a [`crate::ir::Specification`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported Swagger version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("unresolved parameter reference: {0}")]
    UnresolvedParameter(String),

    #[error("unresolved response reference: {0}")]
    UnresolvedResponse(String),
}

impl ParseError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure while rendering one specification. Aborts that specification only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("unresolved reference to definition `{name}` in {context}")]
    UnresolvedRef { name: String, context: String },

    #[error("type `{name}` is declared with conflicting shapes")]
    NameCollision { name: String },

    #[error("template render failed: {0}")]
    Render(String),
}

/// An [`EmitError`] bound to the source that produced it.
#[derive(Debug, Error)]
#[error("{source_id} ({title}): {error}")]
pub struct SpecFailure {
    pub source_id: String,
    pub title: String,
    pub error: EmitError,
}

/// A non-fatal finding reported alongside generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source_id: String,
    pub operation: String,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Several 2xx responses with different shapes; the lowest code was used.
    AmbiguousSuccessResponse { chosen: u16, codes: Vec<u16> },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::AmbiguousSuccessResponse { chosen, codes } => write!(
                f,
                "{}: operation `{}` declares differently shaped success responses {:?}; using {}",
                self.source_id, self.operation, codes, chosen
            ),
        }
    }
}
