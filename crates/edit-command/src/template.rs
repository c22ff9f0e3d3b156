//! Inline templates.
//!
//! A template is text with `$NAME$` placeholders. The UI lets the user tab through the
//! placeholders; `$END$` marks where the caret lands when the template is finished.

use crate::text::TextRange;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const END_VARIABLE: &str = "END";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\$").expect("valid placeholder regex")
    })
}

/// A template variable and the value it starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateVariable {
    /// Placeholder name (without the `$` delimiters).
    pub name: String,
    /// Initial value.
    pub default: String,
}

/// Template text plus its variables in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    text: String,
    variables: Vec<TemplateVariable>,
}

/// A template with concrete values substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExpansion {
    /// Expanded text.
    pub text: String,
    /// Ranges of each placeholder occurrence (relative to `text`).
    pub variables: Vec<(String, TextRange)>,
    /// Final caret offset, if the template has `$END$`.
    pub end: Option<usize>,
}

/// Values the user settled on when the template was finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateOutcome {
    /// Final value per variable name.
    pub values: BTreeMap<String, String>,
}

impl TemplateOutcome {
    /// Value of a variable, if the UI reported one.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl Template {
    /// Parse `$NAME$` placeholders out of `text`.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut variables: Vec<TemplateVariable> = Vec::new();
        for caps in placeholder_regex().captures_iter(&text) {
            let name = &caps[1];
            if name == END_VARIABLE || variables.iter().any(|v| v.name == name) {
                continue;
            }
            variables.push(TemplateVariable {
                name: name.to_string(),
                default: name.to_string(),
            });
        }
        Self { text, variables }
    }

    /// Set the initial value of a variable.
    pub fn with_default(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Some(variable) = self.variables.iter_mut().find(|v| v.name == name) {
            variable.default = value.into();
        }
        self
    }

    /// Raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Variables in first-appearance order.
    pub fn variables(&self) -> &[TemplateVariable] {
        &self.variables
    }

    /// Substitute `values`; variables without a value use their default.
    pub fn expand(&self, values: &BTreeMap<String, String>) -> TemplateExpansion {
        let mut text = String::with_capacity(self.text.len());
        let mut ranges = Vec::new();
        let mut end = None;
        let mut chars = 0usize;
        let mut last = 0usize;

        for caps in placeholder_regex().captures_iter(&self.text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let literal = &self.text[last..whole.start()];
            text.push_str(literal);
            chars += literal.chars().count();
            last = whole.end();

            let name = name.as_str();
            if name == END_VARIABLE {
                end = Some(chars);
                continue;
            }

            let value = values
                .get(name)
                .map(String::as_str)
                .or_else(|| {
                    self.variables
                        .iter()
                        .find(|v| v.name == name)
                        .map(|v| v.default.as_str())
                })
                .unwrap_or(name);
            text.push_str(value);
            let len = value.chars().count();
            ranges.push((name.to_string(), TextRange::new(chars, chars + len)));
            chars += len;
        }
        text.push_str(&self.text[last..]);

        TemplateExpansion {
            text,
            variables: ranges,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables_in_order() {
        let template = Template::parse("for $VAR$ in $ITER$ { $VAR$; $END$ }");
        let names: Vec<&str> = template.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["VAR", "ITER"]);
    }

    #[test]
    fn test_expand_defaults_and_end() {
        let template = Template::parse("let $NAME$ = $VALUE$;$END$")
            .with_default("NAME", "x")
            .with_default("VALUE", "0");

        let expansion = template.expand(&BTreeMap::new());

        assert_eq!(expansion.text, "let x = 0;");
        assert_eq!(
            expansion.variables,
            vec![
                ("NAME".to_string(), TextRange::new(4, 5)),
                ("VALUE".to_string(), TextRange::new(8, 9)),
            ]
        );
        assert_eq!(expansion.end, Some(10));
    }

    #[test]
    fn test_expand_with_values() {
        let template = Template::parse("$A$+$A$");
        let mut values = BTreeMap::new();
        values.insert("A".to_string(), "ab".to_string());
        assert_eq!(template.expand(&values).text, "ab+ab");
    }
}
