// CLI commands for generating and running test harnesses
use anyhow::{bail, Context, Result};
use judgekit_core::config::{JudgeConfig, LanguageConfigManager};
use judgekit_core::error::ConfigError;
use judgekit_core::judge0::Judge0Client;
use judgekit_core::parser::try_parse_test_results;
use judgekit_core::tester::{resolve_function_name, AutomatedTestConfig, AutomatedTester};
use judgekit_core::types::{Language, OverallStatus, TestCase, TestReport, TestStatus, WrapperConfig};
use judgekit_core::wrapper::generate_with;
use judgekit_core::TemplateRegistry;
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Test files may be a bare array or wrapped as {"testCases": [...]}
#[derive(Deserialize)]
#[serde(untagged)]
enum TestFile {
    Cases(Vec<TestCase>),
    Wrapped {
        #[serde(rename = "testCases", alias = "test_cases")]
        test_cases: Vec<TestCase>,
    },
}

fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test cases from {}", path.display()))?;
    parse_test_file(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_test_file(content: &str) -> Result<Vec<TestCase>> {
    let file: TestFile = serde_json::from_str(content)?;
    Ok(match file {
        TestFile::Cases(cases) => cases,
        TestFile::Wrapped { test_cases } => test_cases,
    })
}

fn read_code(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read code from {}", path.display()))
}

/// Language overrides from the configured file; built-ins when the file is absent
fn load_languages(config: &JudgeConfig) -> Result<LanguageConfigManager> {
    match LanguageConfigManager::load(&config.languages_path) {
        Ok(manager) => Ok(manager),
        Err(ConfigError::NotFound(path)) => {
            debug!(path = %path, "No language config file, using built-in languages");
            Ok(LanguageConfigManager::default())
        }
        Err(e) => Err(e).context("Failed to load language config"),
    }
}

fn load_registry(languages: &LanguageConfigManager) -> Result<TemplateRegistry> {
    TemplateRegistry::with_config(languages).context("Failed to build template registry")
}

/// Wrap a solution and its test cases into one program
pub fn generate(
    language: &str,
    code_path: &Path,
    tests_path: &Path,
    function: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let parsed: Language = language.parse()?;
    let user_code = read_code(code_path)?;
    let test_cases = load_test_cases(tests_path)?;
    let resolved = resolve_function_name(function, &user_code, parsed);
    if resolved.inferred {
        eprintln!("🔎 Using inferred entry point: {}", resolved.name);
    }

    let config = JudgeConfig::from_env();
    let registry = load_registry(&load_languages(&config)?)?;
    let test_count = test_cases.len();
    let program = generate_with(
        &registry,
        &WrapperConfig {
            function_name: resolved.name,
            test_cases,
            user_code,
            language: language.to_string(),
        },
    )?;

    match out {
        Some(path) => {
            fs::write(path, &program.source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Generated {} program with {} test case(s)", parsed, test_count);
            println!("📂 Output: {}", path.display());
            println!("🔢 Judge0 language id: {}", program.language_id);
        }
        None => print!("{}", program.source),
    }

    Ok(())
}

/// Print the inferred entry point of a solution
pub fn infer(language: &str, code_path: &Path) -> Result<()> {
    let parsed: Language = language.parse()?;
    let user_code = read_code(code_path)?;

    match judgekit_core::infer_function_name(&user_code, parsed) {
        Some(name) => println!("{}", name),
        None => {
            eprintln!("⚠️  No entry point recognised, falling back to the default");
            println!("{}", judgekit_core::infer::FALLBACK_FUNCTION_NAME);
        }
    }

    Ok(())
}

/// Decode the result block from captured program output
pub fn parse(input: Option<&Path>) -> Result<()> {
    let output = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let results = match try_parse_test_results(&output) {
        Ok(results) => results,
        Err(e) => bail!("No test results recovered: {}", e),
    };

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Run a solution on the configured Judge0 and report the verdict
pub async fn run(
    language: &str,
    code_path: &Path,
    tests_path: &Path,
    function: Option<&str>,
    json: bool,
) -> Result<()> {
    let user_code = read_code(code_path)?;
    let test_cases = load_test_cases(tests_path)?;

    let config = JudgeConfig::from_env();
    let languages = load_languages(&config)?;
    let registry = load_registry(&languages)?;
    let tester = AutomatedTester::new(Judge0Client::from_config(&config), registry)
        .with_languages(languages)
        .with_limits(config.limits)
        .with_poll_policy(config.poll_policy());

    if !json {
        println!("🚀 Running {} test case(s) on {}", test_cases.len(), config.api_url);
    }

    let report = tester
        .run(AutomatedTestConfig {
            user_code,
            language: language.to_string(),
            test_cases,
            function_name: function.map(str::to_string),
            time_limit: None,
            memory_limit: None,
        })
        .await
        .context("Automated test run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn verdict_icon(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Accepted => "✅",
        OverallStatus::WrongAnswer => "❌",
        OverallStatus::TimeLimitExceeded => "⏱️ ",
        OverallStatus::CompilationError | OverallStatus::RuntimeError => "💥",
    }
}

fn result_row(id: u32, status: TestStatus, expected: &str, actual: &str) -> String {
    let mark = match status {
        TestStatus::Passed => "✓",
        TestStatus::Failed => "✗",
        TestStatus::RuntimeError => "!",
    };
    format!("{:<4} {:<6} {:<30} {:<30}", id, mark, truncate(expected, 30), truncate(actual, 30))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

fn print_report(report: &TestReport) {
    println!(
        "\n{} {} ({} / {} passed)",
        verdict_icon(report.overall_status),
        report.overall_status.as_str(),
        report.passed_tests,
        report.total_tests
    );

    if let Some(error) = &report.error {
        println!("\n{}", error.trim_end());
    }

    if !report.test_results.is_empty() {
        println!("\n{:<4} {:<6} {:<30} {:<30}", "Test", "Result", "Expected", "Actual");
        println!("{}", "─".repeat(72));
        for result in &report.test_results {
            println!(
                "{}",
                result_row(result.test_case_id, result.status, &result.expected, &result.actual)
            );
            if let Some(error) = &result.error {
                println!("     ↳ {}", error);
            }
        }
    }

    println!("\n⏱️  {:.0} ms", report.execution_time_ms);
    if let Some(memory) = report.memory_kb {
        println!("💾 {} KB", memory);
    }
}

/// List supported languages
pub fn languages() -> Result<()> {
    let config = JudgeConfig::from_env();
    let languages = load_languages(&config)?;
    let registry = load_registry(&languages)?;

    println!("📋 Supported Languages:\n");
    println!("{:<12} {:<12} {:<10} {:<10}", "Name", "Judge0 Id", "Extension", "CPU/Mem");
    println!("{}", "─".repeat(60));

    for template in registry.templates() {
        let limits = languages.limits_for(template.language, config.limits);
        println!(
            "{:<12} {:<12} {:<10} {:.1}s/{} KB",
            template.language.name(),
            template.language_id,
            template.file_extension,
            limits.cpu_time_limit,
            limits.memory_limit_kb
        );
    }

    println!("\n✅ Total: {} language(s)", registry.templates().len());
    Ok(())
}
