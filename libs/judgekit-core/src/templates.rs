//! Template Registry - Per-Language Program Skeletons
//!
//! Each template is compiled once into literal text and typed slots. Rendering
//! walks the fragments a single time, so user code or test data that happens to
//! contain a slot marker is emitted verbatim and never substituted again.
//!
//! The equality engine is spliced in while compiling; it is trusted static text,
//! not a slot.

use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::debug;

use crate::config::LanguageConfigManager;
use crate::equality;
use crate::error::GenerateError;
use crate::literal::PayloadEncoding;
use crate::types::Language;

const DEEP_EQUAL_MARKER: &str = "{{DEEP_EQUAL}}";

/// Positions in a template filled per generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    UserCode,
    FunctionName,
    TestCases,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::UserCode, Slot::FunctionName, Slot::TestCases];

    pub fn marker(&self) -> &'static str {
        match self {
            Slot::UserCode => "{{USER_CODE}}",
            Slot::FunctionName => "{{FUNCTION_NAME}}",
            Slot::TestCases => "{{TEST_CASES}}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Slot(Slot),
}

/// Values bound to a template's slots for one render
#[derive(Debug, Clone, Copy)]
pub struct SlotValues<'a> {
    pub user_code: &'a str,
    pub function_name: &'a str,
    pub test_cases: &'a str,
}

impl<'a> SlotValues<'a> {
    fn get(&self, slot: Slot) -> &'a str {
        match slot {
            Slot::UserCode => self.user_code,
            Slot::FunctionName => self.function_name,
            Slot::TestCases => self.test_cases,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WrapperTemplate {
    pub language: Language,
    pub language_id: u32,
    pub file_extension: String,
    pub encoding: PayloadEncoding,
    fragments: Vec<Fragment>,
}

impl WrapperTemplate {
    /// Compile raw template text into fragments, checking every slot occurs exactly once
    pub fn compile(
        language: Language,
        language_id: u32,
        file_extension: &str,
        encoding: PayloadEncoding,
        source: &str,
        deep_equal: &str,
    ) -> Result<Self, GenerateError> {
        let source = source.replace(DEEP_EQUAL_MARKER, deep_equal);

        for slot in Slot::ALL {
            let count = source.matches(slot.marker()).count();
            if count != 1 {
                return Err(GenerateError::MalformedTemplate {
                    language: language.to_string(),
                    slot: slot.marker(),
                    count,
                });
            }
        }

        let mut fragments = Vec::new();
        let mut rest = source.as_str();
        while let Some((index, slot)) = Slot::ALL
            .iter()
            .filter_map(|slot| rest.find(slot.marker()).map(|index| (index, *slot)))
            .min_by_key(|(index, _)| *index)
        {
            if index > 0 {
                fragments.push(Fragment::Text(rest[..index].to_string()));
            }
            fragments.push(Fragment::Slot(slot));
            rest = &rest[index + slot.marker().len()..];
        }
        if !rest.is_empty() {
            fragments.push(Fragment::Text(rest.to_string()));
        }

        Ok(Self {
            language,
            language_id,
            file_extension: file_extension.to_string(),
            encoding,
            fragments,
        })
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn render(&self, values: &SlotValues<'_>) -> String {
        let capacity = self
            .fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => text.len(),
                Fragment::Slot(slot) => values.get(*slot).len(),
            })
            .sum();

        let mut out = String::with_capacity(capacity);
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Slot(slot) => out.push_str(values.get(*slot)),
            }
        }
        out
    }
}

struct TemplateSource {
    language: Language,
    language_id: u32,
    file_extension: &'static str,
    encoding: PayloadEncoding,
    source: &'static str,
    deep_equal: &'static str,
}

/// Execution ids follow the stock Judge0 CE language table
const BUILTIN_SOURCES: [TemplateSource; 4] = [
    TemplateSource {
        language: Language::JavaScript,
        language_id: 63,
        file_extension: "js",
        encoding: PayloadEncoding::NativeLiteral,
        source: include_str!("../templates/javascript.js.tmpl"),
        deep_equal: equality::JAVASCRIPT_SNIPPET,
    },
    TemplateSource {
        language: Language::Python,
        language_id: 71,
        file_extension: "py",
        encoding: PayloadEncoding::NativeLiteral,
        source: include_str!("../templates/python.py.tmpl"),
        deep_equal: equality::PYTHON_SNIPPET,
    },
    TemplateSource {
        language: Language::Java,
        language_id: 62,
        file_extension: "java",
        encoding: PayloadEncoding::StringLiteral,
        source: include_str!("../templates/java.java.tmpl"),
        deep_equal: equality::JAVA_SNIPPET,
    },
    TemplateSource {
        language: Language::Cpp,
        language_id: 54,
        file_extension: "cpp",
        encoding: PayloadEncoding::StringLiteral,
        source: include_str!("../templates/cpp.cpp.tmpl"),
        deep_equal: equality::CPP_SNIPPET,
    },
];

lazy_static! {
    static ref BUILTIN: Result<TemplateRegistry, GenerateError> = TemplateRegistry::builtin();
}

/// Read-only mapping from language to compiled template
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<Language, WrapperTemplate>,
}

impl TemplateRegistry {
    /// Compile the built-in templates with their stock execution ids
    pub fn builtin() -> Result<Self, GenerateError> {
        Self::build(|_| None)
    }

    /// Compile the built-in templates, taking execution ids from the language config where set
    pub fn with_config(config: &LanguageConfigManager) -> Result<Self, GenerateError> {
        Self::build(|language| config.get(language).map(|entry| entry.language_id))
    }

    fn build(override_id: impl Fn(Language) -> Option<u32>) -> Result<Self, GenerateError> {
        let mut templates = HashMap::new();
        for source in &BUILTIN_SOURCES {
            let language_id = override_id(source.language).unwrap_or(source.language_id);
            let template = WrapperTemplate::compile(
                source.language,
                language_id,
                source.file_extension,
                source.encoding,
                source.source,
                source.deep_equal,
            )?;
            debug!(
                language = %source.language,
                language_id = language_id,
                fragments = template.fragments().len(),
                "Compiled wrapper template"
            );
            templates.insert(source.language, template);
        }
        Ok(Self { templates })
    }

    /// Shared registry of built-in templates, compiled on first use
    pub fn global() -> Result<&'static TemplateRegistry, GenerateError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Resolve a language name (case-insensitive, common aliases accepted)
    pub fn lookup(&self, language: &str) -> Result<&WrapperTemplate, GenerateError> {
        let parsed: Language = language.parse()?;
        self.get(parsed)
            .ok_or_else(|| GenerateError::UnsupportedLanguage(language.to_string()))
    }

    pub fn get(&self, language: Language) -> Option<&WrapperTemplate> {
        self.templates.get(&language)
    }

    /// Templates in a stable order
    pub fn templates(&self) -> Vec<&WrapperTemplate> {
        Language::ALL
            .iter()
            .filter_map(|language| self.templates.get(language))
            .collect()
    }
}
