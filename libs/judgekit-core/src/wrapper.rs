//! Wrapper Generator - turns user code plus test cases into one runnable program.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::GenerateError;
use crate::literal::encode_payload;
use crate::templates::{SlotValues, TemplateRegistry};
use crate::types::{TestCase, WrappedProgram, WrapperConfig};

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex");
}

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Test cases as the generated program sees them; explanations stay behind
pub fn test_case_payload(test_cases: &[TestCase]) -> Value {
    Value::Array(
        test_cases
            .iter()
            .map(|case| json!({ "input": case.input, "expected": case.expected }))
            .collect(),
    )
}

/// Generate a program using the built-in template registry
pub fn generate_wrapped_code(config: &WrapperConfig) -> Result<WrappedProgram, GenerateError> {
    generate_with(TemplateRegistry::global()?, config)
}

/// Generate a program from an explicit registry
pub fn generate_with(
    registry: &TemplateRegistry,
    config: &WrapperConfig,
) -> Result<WrappedProgram, GenerateError> {
    let template = registry.lookup(&config.language)?;

    if !is_valid_identifier(&config.function_name) {
        return Err(GenerateError::InvalidFunctionName(config.function_name.clone()));
    }

    let payload = test_case_payload(&config.test_cases);
    let test_cases = encode_payload(&payload, template.language, template.encoding);
    debug!(
        language = %template.language,
        encoding = ?template.encoding,
        payload_len = test_cases.len(),
        "Encoded test-case payload"
    );

    let source = template.render(&SlotValues {
        user_code: &config.user_code,
        function_name: &config.function_name,
        test_cases: &test_cases,
    });

    info!(
        language = %template.language,
        function = %config.function_name,
        tests = config.test_cases.len(),
        bytes = source.len(),
        "Generated wrapped program"
    );

    Ok(WrappedProgram {
        source,
        language_id: template.language_id,
        file_extension: template.file_extension.clone(),
    })
}
