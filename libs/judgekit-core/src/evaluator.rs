/// Test Evaluator - Verdict Logic
///
/// **Core Responsibility:**
/// Turn the per-test results a generated program printed into one run verdict.
///
/// **Critical Properties:**
/// - Knows nothing about HTTP or the execution service
/// - Knows nothing about target languages
/// - Pure function: (parsed results, run figures) → report
///
/// **Verdict Rules:**
/// - accepted: every result passed
/// - wrong_answer: at least one result did not pass
/// - batch failures (compilation, runtime, time limit) carry zero results
///
/// **Ordering Rules:**
/// - result i must carry testCaseId i + 1
/// - result count must equal the submitted test-case count
/// - violations are rejected, never reconciled

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::types::{Language, OverallStatus, TestReport, TestResult, TestStatus};

/// Run-level facts gathered before evaluation
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub language: Language,
    pub function_name: String,
    pub total_tests: usize,
    pub execution_time_ms: f64,
    pub memory_kb: Option<u64>,
}

/// Check results line up one-to-one, in order, with the submitted test cases
///
/// ## Returns
/// A description of the first discrepancy on failure
pub fn verify_order(results: &[TestResult], expected_count: usize) -> Result<(), String> {
    if results.len() != expected_count {
        return Err(format!(
            "expected {} results, received {}",
            expected_count,
            results.len()
        ));
    }

    for (index, result) in results.iter().enumerate() {
        let expected_id = index as u32 + 1;
        if result.test_case_id != expected_id {
            return Err(format!(
                "result at position {} has testCaseId {}, expected {}",
                index + 1,
                result.test_case_id,
                expected_id
            ));
        }
    }

    Ok(())
}

pub fn overall_status(results: &[TestResult]) -> OverallStatus {
    if results.iter().all(|result| result.passed) {
        OverallStatus::Accepted
    } else {
        OverallStatus::WrongAnswer
    }
}

/// Aggregate verified results into the final report
pub fn summarize(results: Vec<TestResult>, run: RunContext) -> TestReport {
    let passed_tests = results.iter().filter(|result| result.passed).count();
    let runtime_errors = results
        .iter()
        .filter(|result| result.status == TestStatus::RuntimeError)
        .count();
    let overall_status = overall_status(&results);

    info!(
        run_id = %run.run_id,
        language = %run.language,
        passed = passed_tests,
        total = run.total_tests,
        runtime_errors,
        verdict = overall_status.as_str(),
        "Evaluation complete"
    );

    TestReport {
        run_id: run.run_id,
        language: run.language,
        function_name: run.function_name,
        overall_status,
        passed_tests,
        total_tests: run.total_tests,
        test_results: results,
        execution_time_ms: run.execution_time_ms,
        memory_kb: run.memory_kb,
        error: None,
        finished_at: Utc::now(),
    }
}

/// Report for a run that produced no per-test results
pub fn batch_failure(run: RunContext, status: OverallStatus, error: String) -> TestReport {
    info!(
        run_id = %run.run_id,
        language = %run.language,
        total = run.total_tests,
        verdict = status.as_str(),
        "Run failed before producing results"
    );

    TestReport {
        run_id: run.run_id,
        language: run.language,
        function_name: run.function_name,
        overall_status: status,
        passed_tests: 0,
        total_tests: run.total_tests,
        test_results: Vec::new(),
        execution_time_ms: run.execution_time_ms,
        memory_kb: run.memory_kb,
        error: Some(error),
        finished_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create a result
    fn make_result(id: u32, passed: bool) -> TestResult {
        TestResult {
            test_case_id: id,
            passed,
            input: "[1]".to_string(),
            expected: "1".to_string(),
            actual: if passed { "1" } else { "2" }.to_string(),
            execution_time: Some(0),
            error: None,
            status: if passed { TestStatus::Passed } else { TestStatus::Failed },
        }
    }

    fn make_context(total_tests: usize) -> RunContext {
        RunContext {
            run_id: Uuid::new_v4(),
            language: Language::Python,
            function_name: "solve".to_string(),
            total_tests,
            execution_time_ms: 12.0,
            memory_kb: Some(3000),
        }
    }

    #[test]
    fn test_verify_order_accepts_sequential_ids() {
        let results = vec![make_result(1, true), make_result(2, false), make_result(3, true)];
        assert!(verify_order(&results, 3).is_ok());
        assert!(verify_order(&[], 0).is_ok());
    }

    #[test]
    fn test_verify_order_count_mismatch() {
        let results = vec![make_result(1, true)];
        let err = verify_order(&results, 2).unwrap_err();
        assert_eq!(err, "expected 2 results, received 1");
    }

    #[test]
    fn test_verify_order_out_of_order() {
        let results = vec![make_result(2, true), make_result(1, true)];
        let err = verify_order(&results, 2).unwrap_err();
        assert!(err.contains("testCaseId 2, expected 1"));
    }

    #[test]
    fn test_all_pass() {
        let report = summarize(vec![make_result(1, true), make_result(2, true)], make_context(2));

        assert_eq!(report.overall_status, OverallStatus::Accepted);
        assert_eq!(report.passed_tests, 2);
        assert_eq!(report.total_tests, 2);
        assert_eq!(report.memory_kb, Some(3000));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_partial_pass() {
        let report = summarize(vec![make_result(1, true), make_result(2, false)], make_context(2));

        assert_eq!(report.overall_status, OverallStatus::WrongAnswer);
        assert_eq!(report.passed_tests, 1);
        assert_eq!(report.test_results[1].actual, "2");
    }

    #[test]
    fn test_runtime_error_result_is_wrong_answer() {
        let mut crashed = make_result(1, false);
        crashed.status = TestStatus::RuntimeError;
        crashed.error = Some("ValueError: bad".to_string());

        let report = summarize(vec![crashed], make_context(1));
        assert_eq!(report.overall_status, OverallStatus::WrongAnswer);
        assert_eq!(report.passed_tests, 0);
    }

    #[test]
    fn test_batch_failure_has_no_results() {
        let report = batch_failure(
            make_context(4),
            OverallStatus::CompilationError,
            "Main.java:3: error".to_string(),
        );

        assert_eq!(report.overall_status, OverallStatus::CompilationError);
        assert!(report.test_results.is_empty());
        assert_eq!(report.passed_tests, 0);
        assert_eq!(report.total_tests, 4);
        assert_eq!(report.error.as_deref(), Some("Main.java:3: error"));
    }
}
