// HTTP route handlers for the judgekit API

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use judgekit_core::error::{ExecutionError, JudgeError};
use judgekit_core::judge0::{submit_and_wait, Submission};
use judgekit_core::parser::try_parse_test_results;
use judgekit_core::tester::{resolve_function_name, AutomatedTestConfig};
use judgekit_core::types::{Language, TestCase, TestResult, WrapperConfig};
use judgekit_core::wrapper::generate_with;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::metrics;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub name: String,
    pub language_id: u32,
    pub file_extension: String,
}

/// Same field names as the `/run` body; snake_case spellings are accepted too
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub language: String,
    #[serde(alias = "user_code")]
    pub user_code: String,
    #[serde(default, alias = "function_name")]
    pub function_name: Option<String>,
    #[serde(alias = "test_cases")]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub source: String,
    pub language_id: u32,
    pub file_extension: String,
    pub function_name: String,
    pub inferred: bool,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub recovered: bool,
    pub results: Vec<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": message.into()
        })),
    )
        .into_response()
}

fn execution_error_status(e: &ExecutionError) -> StatusCode {
    match e {
        ExecutionError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ExecutionError::Http(_) | ExecutionError::Status { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /languages - Supported languages and their Judge0 ids
pub async fn list_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let languages: Vec<LanguageInfo> = state
        .tester
        .registry()
        .templates()
        .into_iter()
        .map(|template| LanguageInfo {
            name: template.language.to_string(),
            language_id: template.language_id,
            file_extension: template.file_extension.clone(),
        })
        .collect();

    Json(languages)
}

/// POST /generate - Wrap user code and test cases into a runnable program
pub async fn generate_program(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Response {
    let language: Language = match payload.language.parse() {
        Ok(language) => language,
        Err(e) => {
            metrics::record_generation("unknown", "unsupported_language");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let function = resolve_function_name(payload.function_name.as_deref(), &payload.user_code, language);
    let test_count = payload.test_cases.len();
    let result = generate_with(
        state.tester.registry(),
        &WrapperConfig {
            function_name: function.name.clone(),
            test_cases: payload.test_cases,
            user_code: payload.user_code,
            language: payload.language,
        },
    );

    match result {
        Ok(program) => {
            metrics::record_generation(language.name(), "ok");
            info!(
                language = %language,
                function = %function.name,
                inferred = function.inferred,
                tests = test_count,
                "Program generated"
            );
            (
                StatusCode::OK,
                Json(GenerateResponse {
                    source: program.source,
                    language_id: program.language_id,
                    file_extension: program.file_extension,
                    function_name: function.name,
                    inferred: function.inferred,
                }),
            )
                .into_response()
        }
        Err(e) => {
            metrics::record_generation(language.name(), "error");
            warn!(language = %language, error = %e, "Generation rejected");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// POST /parse - Extract the result block from captured program output
pub async fn parse_output(Json(payload): Json<ParseRequest>) -> impl IntoResponse {
    let response = match try_parse_test_results(&payload.output) {
        Ok(results) => ParseResponse {
            recovered: true,
            results,
            error: None,
        },
        Err(e) => ParseResponse {
            recovered: false,
            results: Vec::new(),
            error: Some(e.to_string()),
        },
    };

    Json(response)
}

/// POST /run - Generate, execute and judge a submission
pub async fn run_tests(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AutomatedTestConfig>,
) -> Response {
    let started = Instant::now();
    let language_label = payload
        .language
        .parse::<Language>()
        .map(|language| language.name())
        .unwrap_or("unknown");

    match state.tester.run(payload).await {
        Ok(report) => {
            metrics::record_run(
                language_label,
                report.overall_status.as_str(),
                started.elapsed().as_secs_f64(),
            );
            info!(
                run_id = %report.run_id,
                verdict = report.overall_status.as_str(),
                passed = report.passed_tests,
                total = report.total_tests,
                "Run complete"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(JudgeError::Generate(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(JudgeError::Execution(e)) => {
            error!(error = %e, "Execution service failure");
            metrics::record_run(language_label, "execution_error", started.elapsed().as_secs_f64());
            error_response(execution_error_status(&e), e.to_string())
        }
        Err(ref e @ JudgeError::ResultsUnavailable {
            ref stdout,
            ref stderr,
            ..
        }) => {
            metrics::record_run(language_label, "results_unavailable", started.elapsed().as_secs_f64());
            warn!(error = %e, "Run finished without readable results");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "stdout": stdout,
                    "stderr": stderr,
                })),
            )
                .into_response()
        }
        Err(e @ JudgeError::ResultMismatch(_)) => {
            metrics::record_run(language_label, "result_mismatch", started.elapsed().as_secs_f64());
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// POST /submissions - Pass a raw submission through to Judge0 and wait for it
pub async fn proxy_submission(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<Submission>,
) -> Response {
    info!(language_id = submission.language_id, "Proxying submission");

    match submit_and_wait(state.tester.service(), &submission, state.tester.poll_policy()).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!(error = %e, "Proxied submission failed");
            error_response(execution_error_status(&e), e.to_string())
        }
    }
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_endpoint() -> Response {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
