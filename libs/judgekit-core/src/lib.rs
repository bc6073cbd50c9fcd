//! Test-harness generation for LeetCode-style judging.
//!
//! Generation and parsing are pure; `judge0` and `tester` are the only modules that do I/O.

pub mod config;
pub mod equality;
pub mod error;
pub mod evaluator;
pub mod infer;
pub mod judge0;
pub mod literal;
pub mod parser;
pub mod templates;
pub mod tester;
pub mod types;
pub mod wrapper;

pub use config::{JudgeConfig, LanguageConfigManager, ResourceLimits};
pub use equality::deep_equal;
pub use error::{ConfigError, ExecutionError, GenerateError, JudgeError, ParseError};
pub use infer::{extract_function_name, infer_function_name};
pub use judge0::{submit_and_wait, ExecutionService, Judge0Client, PollPolicy, Submission, SubmissionResult};
pub use parser::{parse_test_results, try_parse_test_results, RESULTS_END, RESULTS_START};
pub use templates::TemplateRegistry;
pub use tester::{AutomatedTestConfig, AutomatedTester};
pub use types::{
    Language, OverallStatus, TestCase, TestReport, TestResult, TestStatus, WrappedProgram,
    WrapperConfig,
};
pub use wrapper::{generate_wrapped_code, generate_with};

#[cfg(test)]
mod judge0_tests;
