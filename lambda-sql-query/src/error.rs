//! Error types for filter construction with actionable messages.
//!
//! Every error is raised synchronously by the call that detected it: field
//! construction, operator application, or configuration loading. Rendering a
//! complete filter never fails.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: L{category}{number}
//! - 1xxx: Selector errors (malformed selector, wrong entity)
//! - 2xxx: Value errors (unsupported type, empty list, empty value)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use lambda_sql_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::empty_value_list("Id");
//! assert_eq!(err.code, ErrorCode::EmptyValueList);
//! assert_eq!(err.code.code(), "L2002");
//! assert!(err.to_string().contains("Id"));
//! ```

use std::convert::Infallible;
use std::fmt;
use thiserror::Error;

/// Result type for filter operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Selector errors (1xxx)
    /// The selector is not a simple property access (L1001).
    InvalidSelector = 1001,
    /// A field belongs to a different entity than expected (L1002).
    TypeMismatch = 1002,

    // Value errors (2xxx)
    /// The parameter formatter cannot render the value (L2001).
    UnsupportedType = 2001,
    /// `IN` / `NOT IN` received no values (L2002).
    EmptyValueList = 2002,
    /// An empty string was passed as a parameter value (L2003).
    EmptyValue = 2003,

    // Configuration errors (7xxx)
    /// Invalid configuration (L7001).
    InvalidConfiguration = 7001,
    /// Configuration file could not be read (L7002).
    ConfigurationIo = 7002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "L1001").
    pub fn code(&self) -> String {
        format!("L{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidSelector => "Invalid property selector",
            Self::TypeMismatch => "Field belongs to another entity",
            Self::UnsupportedType => "Unsupported parameter type",
            Self::EmptyValueList => "Empty value list",
            Self::EmptyValue => "Empty parameter value",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::ConfigurationIo => "Configuration file unreadable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The entity involved.
    pub entity: Option<String>,
    /// The field or selector involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors raised while building filters.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl From<Infallible> for QueryError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an invalid selector error.
    pub fn invalid_selector(entity: impl Into<String>, selector: impl Into<String>, reason: impl Into<String>) -> Self {
        let entity = entity.into();
        let selector = selector.into();
        Self::new(
            ErrorCode::InvalidSelector,
            format!("Selector `{}` on {} is not a property access: {}", selector, entity, reason.into()),
        )
        .with_entity(&entity)
        .with_field(&selector)
        .with_suggestion("Select a single declared property, without paths or calls")
        .with_code_suggestion(
            "Use the selector constants generated by the derive",
            format!("ctx.field({}::ID)", entity),
        )
    }

    /// Create an entity mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>, field: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        let field = field.into();
        Self::new(
            ErrorCode::TypeMismatch,
            format!("Field {}.{} cannot be used as a field of {}", actual, field, expected),
        )
        .with_entity(&expected)
        .with_field(&field)
        .with_suggestion(format!("Build the filter on {} instead, or combine filters with and_combined()", actual))
    }

    /// Create an unsupported parameter type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(
            ErrorCode::UnsupportedType,
            format!("Type {} is not supported as parameter", type_name),
        )
        .with_suggestion("Use an integer, boolean or non-empty string value")
        .with_help("Install a custom ParameterFormatter on the SqlContext to render other types")
    }

    /// Create an error for an integer that does not fit in 64 bits.
    pub fn out_of_range(type_name: &str, value: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedType,
            format!("Value {} of type {} does not fit in a 64-bit integer", value, type_name),
        )
        .with_suggestion("Compare against a value within the i64 range")
    }

    /// Create an empty value list error.
    pub fn empty_value_list(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::EmptyValueList,
            format!("IN list for {} has no values", field),
        )
        .with_field(&field)
        .with_suggestion("Skip the condition when there is nothing to match")
    }

    /// Create an empty value error.
    pub fn empty_value() -> Self {
        Self::new(ErrorCode::EmptyValue, "The value is empty")
            .with_suggestion("Use is_null() to match missing values")
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid configuration: {}", message.into()),
        )
    }

    /// Create a configuration IO error.
    pub fn configuration_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::ConfigurationIo,
            format!("Cannot read configuration file {}", path),
        )
        .with_source(source)
        .with_suggestion("Check that the file exists and is readable")
    }

    // ============== Error Checks ==============

    /// Check if this error was caused by a selector or field reference.
    pub fn is_selector_error(&self) -> bool {
        matches!(self.code, ErrorCode::InvalidSelector | ErrorCode::TypeMismatch)
    }

    /// Check if this error was caused by a parameter value.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnsupportedType | ErrorCode::EmptyValueList | ErrorCode::EmptyValue
        )
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self.code, ErrorCode::InvalidConfiguration | ErrorCode::ConfigurationIo)
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref entity) = self.context.entity {
            output.push_str(&format!("  → Entity: {}\n", entity));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     ```\n     {}\n     ```\n", code.replace('\n', "\n     ")));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}
