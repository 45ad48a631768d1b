//! Unified error type for the checker.

use thiserror::Error;

/// All errors that can abort a check run.
///
/// Findings in the checked code are never errors; they are reported as
/// [`Diagnostic`](crate::Diagnostic)s.
#[derive(Error, Debug)]
pub enum CheckError {
    /// I/O error (file read, directory access, stdout)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path given on the command line does not exist
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    /// The C# grammar could not be loaded into the parser
    #[error("Failed to load C# grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// tree-sitter produced no tree for a file
    #[error("Failed to parse {path}")]
    SourceParse { path: String },

    /// JSON rendering of the report failed
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    /// The run was interrupted
    #[error("Check cancelled")]
    Cancelled,

    /// A worker thread panicked
    #[error("A worker thread panicked")]
    WorkerPanicked,

    /// Argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CheckError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = CheckError::PathNotFound("/nonexistent".to_string());
        assert!(err.to_string().contains("/nonexistent"));
    }

    #[test]
    fn test_source_parse_display() {
        let err = CheckError::SourceParse { path: "src/Program.cs".to_string() };
        assert_eq!(err.to_string(), "Failed to parse src/Program.cs");
    }

    #[test]
    fn test_output_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CheckError = json_err.into();
        assert!(matches!(err, CheckError::Output(_)));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: CheckError = io_err.into();
        assert!(matches!(err, CheckError::Io(_)));
    }
}
