use thiserror::Error;

/// Failures while assembling a wrapped program
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Invalid function name: {0:?}")]
    InvalidFunctionName(String),
    #[error("Template for {language} must contain slot {slot} exactly once (found {count})")]
    MalformedTemplate {
        language: String,
        slot: &'static str,
        count: usize,
    },
}

/// Why no structured results could be recovered from program output
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Could not find the results start marker in output")]
    MissingStartMarker,
    #[error("Could not find the results end marker in output")]
    MissingEndMarker,
    #[error("Malformed results payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failures talking to the remote execution service
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Execution service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Timeout waiting for code execution after {attempts} polls")]
    Timeout { attempts: u32 },
}

/// Failures loading the language configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Language config file not found: {0}")]
    NotFound(String),
    #[error("Failed to read language config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse language config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Language(#[from] GenerateError),
}

/// Errors surfaced by an automated test run
///
/// Compilation and runtime failures of the submission are not errors: they are
/// reported through `TestReport::overall_status`.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("No test results found in output: {reason}")]
    ResultsUnavailable {
        reason: ParseError,
        stdout: String,
        stderr: String,
    },
    #[error("Test results do not line up with the submitted test cases: {0}")]
    ResultMismatch(String),
}

pub type Result<T> = std::result::Result<T, JudgeError>;
