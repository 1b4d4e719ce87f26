//! Error types for the draupnir-rs library.
//!
//! All fallible operations in the crate return [`Result`], built on a single
//! structured error enum so that callers can match on failure categories
//! (configuration, parsing, malformed trees) without string inspection.

use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// Main result type for draupnir operations.
pub type Result<T> = std::result::Result<T, DraupnirError>;

/// Error type covering every failure mode of the detection pipeline.
#[derive(Error, Debug)]
pub enum DraupnirError {
    /// I/O related errors (file reads, report writes)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Source parsing errors from the language front-end
    #[error("Parse error in {language}: {message}")]
    Parse {
        /// Language being parsed
        language: String,
        /// Error description
        message: String,
        /// File where the error occurred
        file: Option<String>,
    },

    /// A function tree that violates the construct's operand contract,
    /// e.g. a binary operation missing one of its sides. Fails that one
    /// function; the rest of the corpus continues.
    #[error("Malformed tree in `{function}`: {message}")]
    MalformedTree {
        /// Function whose tree is unusable
        function: String,
        /// What was missing or inconsistent
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being produced or consumed
        format: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Detection pipeline errors
    #[error("Pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// Pipeline stage where the error occurred (walk, parse, prepare,
        /// compare, report)
        stage: String,
        /// Error description
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl DraupnirError {
    /// Create a new I/O error with context.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error naming the offending field.
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error.
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Create a new parse error with file context.
    pub fn parse_in_file(
        language: impl Into<String>,
        message: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Create a new malformed-tree error for a single function.
    pub fn malformed_tree(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedTree {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a new pipeline error.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an existing error where the variant carries it.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Self::Internal { context: ctx, .. } = &mut self {
            *ctx = Some(context.into());
        }
        self
    }
}

impl From<io::Error> for DraupnirError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for DraupnirError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            format: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for DraupnirError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            format: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<handlebars::RenderError> for DraupnirError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Serialization {
            message: format!("HTML template rendering failed: {err}"),
            format: Some("HTML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<Utf8Error> for DraupnirError {
    fn from(err: Utf8Error) -> Self {
        Self::parse("unknown", format!("UTF-8 encoding error: {err}"))
    }
}

/// Result extension trait for attaching context to errors.
pub trait ResultExt<T> {
    /// Add lazily-built context to an error result.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result.
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DraupnirError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}
