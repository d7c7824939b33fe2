//! Error types for building, validating and rendering templates

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in a substitution string
pub type Span = std::ops::Range<usize>;

/// The namespace an entry lives in, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Resource,
    Output,
    Parameter,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Resource => write!(f, "resource"),
            EntryKind::Output => write!(f, "output"),
            EntryKind::Parameter => write!(f, "parameter"),
        }
    }
}

/// Errors that can occur while assembling or rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A name is already taken in its namespace
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: EntryKind, name: String },

    /// A logical name is empty, too long, or not alphanumeric
    #[error("invalid {kind} name '{name}': logical names must be 1-255 alphanumeric characters")]
    InvalidName { kind: EntryKind, name: String },

    /// A property value does not have the minimal expected shape
    #[error("malformed property '{path}' in {location}: {reason}")]
    MalformedProperty {
        location: String,
        path: String,
        reason: String,
    },

    /// A `Fn::Sub` string could not be parsed
    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    /// A reference points at a name that is not declared
    #[error("unresolved reference to '{target}' in {location}{}", format_suggestions(.suggestions))]
    UnresolvedReference {
        location: String,
        target: String,
        suggestions: Vec<String>,
    },

    /// Resources depend on each other in a loop
    #[error("circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TemplateError {
    /// Create an unresolved reference error
    pub fn unresolved(
        location: impl Into<String>,
        target: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self::UnresolvedReference {
            location: location.into(),
            target: target.into(),
            suggestions,
        }
    }

    /// Create a malformed property error
    pub fn malformed(
        location: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedProperty {
            location: location.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnresolvedReference { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

/// A malformed `Fn::Sub` template string
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid substitution at {span:?} in \"{template}\": {message}")]
pub struct SubstitutionError {
    pub template: String,
    pub span: Span,
    pub message: String,
}

impl SubstitutionError {
    pub fn new(template: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            span,
            message: message.into(),
        }
    }

    /// Format the error with the substitution string as source context
    pub fn format(&self, filename: &str) -> String {
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(self.template.as_str())), &mut buf);

        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| self.to_string()),
            Err(_) => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
