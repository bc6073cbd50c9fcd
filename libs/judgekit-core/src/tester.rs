//! Automated Tester - inference, generation, execution, parsing and verdict in one call.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{LanguageConfigManager, ResourceLimits};
use crate::error::{JudgeError, Result};
use crate::evaluator::{self, RunContext};
use crate::infer::{infer_function_name, FALLBACK_FUNCTION_NAME};
use crate::judge0::{status, submit_and_wait, ExecutionService, PollPolicy, Submission, SubmissionResult};
use crate::parser::try_parse_test_results;
use crate::templates::TemplateRegistry;
use crate::types::{Language, OverallStatus, TestCase, TestReport, WrapperConfig};
use crate::wrapper::generate_with;

/// One automated test request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedTestConfig {
    pub user_code: String,
    pub language: String,
    pub test_cases: Vec<TestCase>,
    /// Inferred from `user_code` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Seconds of CPU time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,
    /// Kilobytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
}

/// Entry point that was used for a run, and whether it was guessed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFunction {
    pub name: String,
    pub inferred: bool,
}

/// Explicit name when given, otherwise the inferred one (or the fallback)
pub fn resolve_function_name(
    explicit: Option<&str>,
    user_code: &str,
    language: Language,
) -> ResolvedFunction {
    if let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) {
        return ResolvedFunction {
            name: name.to_string(),
            inferred: false,
        };
    }

    let name = match infer_function_name(user_code, language) {
        Some(name) => {
            warn!(%language, function = %name, "No function name supplied, using inferred entry point");
            name
        }
        None => {
            warn!(%language, "No function name supplied or recognised, falling back to default");
            FALLBACK_FUNCTION_NAME.to_string()
        }
    };

    ResolvedFunction {
        name,
        inferred: true,
    }
}

pub struct AutomatedTester<S> {
    service: S,
    registry: TemplateRegistry,
    languages: LanguageConfigManager,
    limits: ResourceLimits,
    policy: PollPolicy,
}

impl<S: ExecutionService> AutomatedTester<S> {
    pub fn new(service: S, registry: TemplateRegistry) -> Self {
        Self {
            service,
            registry,
            languages: LanguageConfigManager::default(),
            limits: ResourceLimits::default(),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_languages(mut self, languages: LanguageConfigManager) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Generate, execute and judge one submission
    ///
    /// Compilation, runtime and time-limit failures of the submission come back
    /// as an `Ok` report with no per-test results.
    #[instrument(skip(self, config), fields(language = %config.language, tests = config.test_cases.len()))]
    pub async fn run(&self, config: AutomatedTestConfig) -> Result<TestReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let language: Language = config.language.parse()?;
        let function =
            resolve_function_name(config.function_name.as_deref(), &config.user_code, language);
        let total_tests = config.test_cases.len();

        let program = generate_with(
            &self.registry,
            &WrapperConfig {
                function_name: function.name.clone(),
                test_cases: config.test_cases,
                user_code: config.user_code,
                language: config.language,
            },
        )?;

        let defaults = self.languages.limits_for(language, self.limits);
        let submission = Submission {
            source_code: program.source,
            language_id: program.language_id,
            stdin: None,
            cpu_time_limit: Some(config.time_limit.unwrap_or(defaults.cpu_time_limit)),
            memory_limit: Some(config.memory_limit.unwrap_or(defaults.memory_limit_kb)),
        };

        info!(%run_id, function = %function.name, language_id = program.language_id, "Submitting wrapped program");
        let result = submit_and_wait(&self.service, &submission, &self.policy).await?;
        info!(
            %run_id,
            status_id = result.status.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Execution finished"
        );

        let run = RunContext {
            run_id,
            language,
            function_name: function.name,
            total_tests,
            execution_time_ms: result.time_ms(),
            memory_kb: result.memory,
        };

        judge(result, run)
    }
}

/// Classify a finished submission and, on success, evaluate its results
pub fn judge(result: SubmissionResult, run: RunContext) -> Result<TestReport> {
    match result.status.id {
        status::ACCEPTED => {}
        status::COMPILATION_ERROR => {
            let error = first_text(&[&result.compile_output, &result.stderr])
                .unwrap_or("Compilation failed");
            return Ok(evaluator::batch_failure(
                run,
                OverallStatus::CompilationError,
                error.to_string(),
            ));
        }
        status::TIME_LIMIT_EXCEEDED => {
            let error = first_text(&[&result.stderr, &result.message])
                .unwrap_or("Time limit exceeded");
            return Ok(evaluator::batch_failure(
                run,
                OverallStatus::TimeLimitExceeded,
                error.to_string(),
            ));
        }
        _ => {
            let error = first_text(&[&result.stderr, &result.message])
                .map(str::to_string)
                .unwrap_or_else(|| format!("Runtime error ({})", result.status.description));
            return Ok(evaluator::batch_failure(
                run,
                OverallStatus::RuntimeError,
                error,
            ));
        }
    }

    let stdout = result.stdout.unwrap_or_default();
    let results = match try_parse_test_results(&stdout) {
        Ok(results) => results,
        Err(reason) => {
            warn!(run_id = %run.run_id, error = %reason, "No test results recovered from output");
            return Err(JudgeError::ResultsUnavailable {
                reason,
                stdout,
                stderr: result.stderr.unwrap_or_default(),
            });
        }
    };

    evaluator::verify_order(&results, run.total_tests).map_err(JudgeError::ResultMismatch)?;

    Ok(evaluator::summarize(results, run))
}

fn first_text<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|candidate| candidate.as_deref())
        .find(|text| !text.trim().is_empty())
}
