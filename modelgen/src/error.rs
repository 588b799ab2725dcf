//! Error and diagnostic types for model generation.
//!
//! Fatal problems stop generation and surface as [`GenerateError`]. Problems
//! that only degrade a single member or unit are collected as [`Diagnostic`]s
//! and generation carries on.

use std::fmt;
use thiserror::Error;

/// Result type alias for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Fatal generation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// A unit was re-entered while it was still being emitted.
    #[error("Recursive emission of '{unit}' (path: {})", .path.join(" -> "))]
    RecursionCycle { unit: String, path: Vec<String> },

    /// A uid passed to the engine is not in the registry.
    #[error("Content type '{uid}' is not registered")]
    UnknownContentType { uid: String },
}

impl GenerateError {
    /// Create a recursion cycle error.
    pub fn cycle(unit: impl Into<String>, path: Vec<String>) -> Self {
        Self::RecursionCycle {
            unit: unit.into(),
            path,
        }
    }
}

/// Category of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Field declared a data type the generator does not know.
    UnknownDataKind,
    /// Reference target is missing or not registered.
    UnresolvedReference,
    /// Reference names several targets and cannot be typed.
    AmbiguousReference,
    /// Two units derived the same qualified name, or two members of one unit
    /// derived the same identifier.
    NameCollision,
    /// A blocks field declared the same variant uid twice.
    DuplicateVariant,
    /// A title or uid derived no identifier and a fallback name was used.
    EmptyName,
}

impl DiagnosticKind {
    /// Whether this kind points at a schema problem worth a warning.
    ///
    /// Multi-target references are ordinary in content models and are only
    /// reported at debug level.
    pub fn is_warning(self) -> bool {
        !matches!(self, Self::AmbiguousReference)
    }

    fn label(self) -> &'static str {
        match self {
            Self::UnknownDataKind => "unknown data type",
            Self::UnresolvedReference => "unresolved reference",
            Self::AmbiguousReference => "ambiguous reference",
            Self::NameCollision => "name collision",
            Self::DuplicateVariant => "duplicate block variant",
            Self::EmptyName => "unnamed type",
        }
    }
}

/// Non-fatal problem found while generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// What the diagnostic is about, e.g. `Article.author`.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {}", self.kind.label(), self.subject, self.message)
    }
}
