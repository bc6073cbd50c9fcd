use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::GenerateError;

/// Target languages a harness can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "js", alias = "node")]
    JavaScript,
    #[serde(alias = "py", alias = "python3")]
    Python,
    Java,
    #[serde(alias = "c++")]
    Cpp,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "python" | "py" | "python3" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            _ => Err(GenerateError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// A single problem test case: positional arguments plus the expected return value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<Value>,
    pub expected: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Everything needed to produce one wrapped program
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapperConfig {
    pub function_name: String,
    pub test_cases: Vec<TestCase>,
    pub user_code: String,
    pub language: String,
}

/// Generated program text, tagged for the execution service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedProgram {
    pub source: String,
    pub language_id: u32,
    pub file_extension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    RuntimeError,
}

/// One entry of the sentinel-delimited result payload printed by a generated program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_case_id: u32,
    pub passed: bool,
    pub input: String,
    pub expected: String,
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: TestStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Accepted,
    WrongAnswer,
    RuntimeError,
    CompilationError,
    TimeLimitExceeded,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Accepted => "accepted",
            OverallStatus::WrongAnswer => "wrong_answer",
            OverallStatus::RuntimeError => "runtime_error",
            OverallStatus::CompilationError => "compilation_error",
            OverallStatus::TimeLimitExceeded => "time_limit_exceeded",
        }
    }
}

/// Verdict for one automated test run
///
/// `test_results` is empty whenever `overall_status` is a batch-level failure
/// (compilation, runtime or time limit); callers must not read that as "0/N passed".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub run_id: Uuid,
    pub language: Language,
    pub function_name: String,
    pub overall_status: OverallStatus,
    pub passed_tests: usize,
    pub total_tests: usize,
    pub test_results: Vec<TestResult>,
    pub execution_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_kb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_parsing() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("JavaScript".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("node".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!(" Java ".parse::<Language>().unwrap(), Language::Java);
    }

    #[test]
    fn test_unknown_language_is_unsupported() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedLanguage(ref name) if name == "cobol"));
    }

    #[test]
    fn test_language_display_roundtrip() {
        for language in Language::ALL {
            assert_eq!(language.to_string().parse::<Language>().unwrap(), language);
        }
    }

    #[test]
    fn test_result_wire_names() {
        let result = TestResult {
            test_case_id: 1,
            passed: false,
            input: "[1]".to_string(),
            expected: "2".to_string(),
            actual: "Error".to_string(),
            execution_time: None,
            error: Some("boom".to_string()),
            status: TestStatus::RuntimeError,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["testCaseId"], json!(1));
        assert_eq!(value["status"], json!("runtime_error"));
        assert_eq!(value["error"], json!("boom"));
        assert!(value.get("executionTime").is_none());
    }

    #[test]
    fn test_case_explanation_is_optional() {
        let case: TestCase =
            serde_json::from_value(json!({"input": [[2, 7], 9], "expected": [0, 1]})).unwrap();
        assert_eq!(case.input.len(), 2);
        assert!(case.explanation.is_none());
    }
}
