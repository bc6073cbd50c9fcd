//! Result Parser - recovers the sentinel-delimited result block from program stdout.
//!
//! User code may print anything before or after the block; only the text between
//! the first start marker and the first end marker following it is decoded.

use tracing::warn;

use crate::error::ParseError;
use crate::types::TestResult;

pub const RESULTS_START: &str = "JUDGE_RESULTS_START";
pub const RESULTS_END: &str = "JUDGE_RESULTS_END";

/// Extract the result block, distinguishing every way it can be unrecoverable
pub fn try_parse_test_results(output: &str) -> Result<Vec<TestResult>, ParseError> {
    let start = output
        .find(RESULTS_START)
        .ok_or(ParseError::MissingStartMarker)?;
    let body = &output[start + RESULTS_START.len()..];
    let end = body.find(RESULTS_END).ok_or(ParseError::MissingEndMarker)?;

    let results = serde_json::from_str(body[..end].trim())?;
    Ok(results)
}

/// Lenient variant: unrecoverable output yields an empty list
pub fn parse_test_results(output: &str) -> Vec<TestResult> {
    match try_parse_test_results(output) {
        Ok(results) => results,
        Err(e) => {
            warn!(error = %e, output_len = output.len(), "Failed to parse test results");
            Vec::new()
        }
    }
}

/// Render results in the wire format a generated program prints
pub fn format_result_block(results: &[TestResult]) -> Result<String, serde_json::Error> {
    Ok(format!(
        "{}\n{}\n{}\n",
        RESULTS_START,
        serde_json::to_string(results)?,
        RESULTS_END
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestStatus;

    fn make_result(id: u32, passed: bool, actual: &str) -> TestResult {
        TestResult {
            test_case_id: id,
            passed,
            input: "[[2,7,11,15],9]".to_string(),
            expected: "[0,1]".to_string(),
            actual: actual.to_string(),
            execution_time: Some(0),
            error: None,
            status: if passed { TestStatus::Passed } else { TestStatus::Failed },
        }
    }

    #[test]
    fn test_block_round_trip() {
        let results = vec![make_result(1, true, "[0,1]"), make_result(2, false, "[1,2]")];
        let block = format_result_block(&results).unwrap();
        assert_eq!(parse_test_results(&block), results);
    }

    #[test]
    fn test_ignores_surrounding_user_output() {
        let results = vec![make_result(1, true, "[0,1]")];
        let output = format!(
            "debug: starting\nsome noise\n{}after the block\n",
            format_result_block(&results).unwrap()
        );
        assert_eq!(parse_test_results(&output), results);
    }

    #[test]
    fn test_missing_start_marker() {
        assert!(parse_test_results("Traceback (most recent call last):\n").is_empty());
        assert!(matches!(
            try_parse_test_results("[]\nJUDGE_RESULTS_END"),
            Err(ParseError::MissingStartMarker)
        ));
    }

    #[test]
    fn test_missing_end_marker() {
        let output = "JUDGE_RESULTS_START\n[]\n";
        assert!(parse_test_results(output).is_empty());
        assert!(matches!(
            try_parse_test_results(output),
            Err(ParseError::MissingEndMarker)
        ));
    }

    #[test]
    fn test_end_marker_before_start_is_ignored() {
        let output = "JUDGE_RESULTS_END\nJUDGE_RESULTS_START\n[]\n";
        assert!(matches!(
            try_parse_test_results(output),
            Err(ParseError::MissingEndMarker)
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let output = "JUDGE_RESULTS_START\n[{\"testCaseId\": 1,\nJUDGE_RESULTS_END\n";
        assert!(matches!(
            try_parse_test_results(output),
            Err(ParseError::Malformed(_))
        ));
        assert!(parse_test_results(output).is_empty());
    }

    #[test]
    fn test_empty_block_is_zero_results() {
        let output = "JUDGE_RESULTS_START\n[]\nJUDGE_RESULTS_END\n";
        assert_eq!(try_parse_test_results(output).unwrap(), Vec::new());
    }

    #[test]
    fn test_parses_program_output_shape() {
        let output = r#"JUDGE_RESULTS_START
[{"testCaseId":1,"passed":false,"input":"[1]","expected":"2","actual":"Error","executionTime":0,"error":"ZeroDivisionError: division by zero","status":"runtime_error"}]
JUDGE_RESULTS_END
"#;
        let results = try_parse_test_results(output).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, TestStatus::RuntimeError);
        assert_eq!(
            results[0].error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
    }
}
