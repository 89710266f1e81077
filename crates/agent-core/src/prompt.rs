//! Prompt Templates
//!
//! `{name}` marks a slot, `{{` and `}}` are literal braces. Values are
//! inserted verbatim, so LLM output fed into a later prompt is never
//! re-interpreted as a template.

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Anything that can be rendered into prompt text from named variables
pub trait Prompt: Send + Sync {
    /// Render the prompt, filling every slot from `vars`
    fn format(&self, vars: &[(&str, &str)]) -> Result<String>;

    /// Slot names in order of first appearance
    fn input_variables(&self) -> Vec<String>;
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(String),
    Var(&'a str),
}

fn parse_segments(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, next)| next) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, next)| next) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let end = loop {
                    match chars.next() {
                        Some((i, '}')) => break i,
                        Some((_, '{')) | None => {
                            return Err(AgentError::Template(format!(
                                "Unterminated '{{' at byte {idx}"
                            )));
                        }
                        Some(_) => {}
                    }
                };
                let name = template[idx + 1..end].trim();
                if name.is_empty() {
                    return Err(AgentError::Template(format!("Empty placeholder at byte {idx}")));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Var(name));
            }
            '}' => {
                return Err(AgentError::Template(format!("Single '}}' at byte {idx}")));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Text(literal));
    }

    Ok(segments)
}

fn lookup<'v>(vars: &[(&str, &'v str)], name: &str) -> Option<&'v str> {
    vars.iter().find(|(key, _)| *key == name).map(|(_, value)| *value)
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// A single string template with named slots
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The raw template text
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Prompt for PromptTemplate {
    fn format(&self, vars: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.template.len());

        for segment in parse_segments(&self.template)? {
            match segment {
                Segment::Text(text) => out.push_str(&text),
                Segment::Var(name) => {
                    let value = lookup(vars, name).ok_or_else(|| {
                        AgentError::Template(format!("Missing variable: {name}"))
                    })?;
                    out.push_str(value);
                }
            }
        }

        Ok(out)
    }

    fn input_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(segments) = parse_segments(&self.template) {
            for segment in segments {
                if let Segment::Var(name) = segment {
                    push_unique(&mut names, name);
                }
            }
        }
        names
    }
}

/// A fixed few-shot example
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptExample {
    pub input: String,
    pub output: String,
}

impl PromptExample {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Prefix, rendered examples and suffix joined by a separator.
///
/// Each example is rendered through `example_prompt` with the `input` and
/// `output` slots. Empty pieces are skipped.
#[derive(Clone, Debug)]
pub struct FewShotPromptTemplate {
    examples: Vec<PromptExample>,
    example_prompt: PromptTemplate,
    prefix: PromptTemplate,
    suffix: PromptTemplate,
    example_separator: String,
}

impl FewShotPromptTemplate {
    pub fn new(example_prompt: PromptTemplate, suffix: impl Into<String>) -> Self {
        Self {
            examples: Vec::new(),
            example_prompt,
            prefix: PromptTemplate::from_template(""),
            suffix: PromptTemplate::from_template(suffix),
            example_separator: "\n\n".into(),
        }
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = PromptTemplate::from_template(prefix);
        self
    }

    #[must_use]
    pub fn example(mut self, example: PromptExample) -> Self {
        self.examples.push(example);
        self
    }

    #[must_use]
    pub fn examples(mut self, examples: impl IntoIterator<Item = PromptExample>) -> Self {
        self.examples.extend(examples);
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.example_separator = separator.into();
        self
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }
}

impl Prompt for FewShotPromptTemplate {
    fn format(&self, vars: &[(&str, &str)]) -> Result<String> {
        let mut pieces = Vec::with_capacity(self.examples.len() + 2);
        pieces.push(self.prefix.format(vars)?);

        for example in &self.examples {
            pieces.push(self.example_prompt.format(&[
                ("input", example.input.as_str()),
                ("output", example.output.as_str()),
            ])?);
        }

        pieces.push(self.suffix.format(vars)?);
        pieces.retain(|piece| !piece.is_empty());

        Ok(pieces.join(&self.example_separator))
    }

    fn input_variables(&self) -> Vec<String> {
        let mut names = self.prefix.input_variables();
        for name in self.suffix.input_variables() {
            push_unique(&mut names, &name);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fills_slots() {
        let prompt = PromptTemplate::from_template("Location: {location}\nResponse:");
        let text = prompt.format(&[("location", "Japan")]).unwrap();
        assert_eq!(text, "Location: Japan\nResponse:");
    }

    #[test]
    fn test_escaped_braces_and_verbatim_values() {
        let prompt = PromptTemplate::from_template("{{\"dish\": \"{dish}\"}}");
        let text = prompt.format(&[("dish", "{not a slot}")]).unwrap();
        assert_eq!(text, "{\"dish\": \"{not a slot}\"}");
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let prompt = PromptTemplate::from_template("Meals: {meal}");
        let err = prompt.format(&[("location", "Peru")]).unwrap_err();
        assert!(matches!(err, AgentError::Template(msg) if msg.contains("meal")));
    }

    #[test]
    fn test_malformed_templates() {
        assert!(PromptTemplate::from_template("oops {unclosed").format(&[]).is_err());
        assert!(PromptTemplate::from_template("stray } brace").format(&[]).is_err());
        assert!(PromptTemplate::from_template("empty {} slot").format(&[]).is_err());
    }

    #[test]
    fn test_input_variables_in_order() {
        let prompt = PromptTemplate::from_template("{b} then {a} then {b} {{c}}");
        assert_eq!(prompt.input_variables(), vec!["b", "a"]);
    }

    #[test]
    fn test_few_shot_layout() {
        let prompt = FewShotPromptTemplate::new(
            PromptTemplate::from_template("Q: {input}\nA: {output}"),
            "Q: {question}\nA:",
        )
        .prefix("Answer briefly.")
        .example(PromptExample::new("1+1", "2"))
        .example(PromptExample::new("2+2", "4"));

        let text = prompt.format(&[("question", "3+3")]).unwrap();
        assert_eq!(
            text,
            "Answer briefly.\n\nQ: 1+1\nA: 2\n\nQ: 2+2\nA: 4\n\nQ: 3+3\nA:"
        );
        assert_eq!(prompt.input_variables(), vec!["question"]);
        assert_eq!(prompt.example_count(), 2);
    }

    #[test]
    fn test_few_shot_skips_empty_prefix() {
        let prompt = FewShotPromptTemplate::new(
            PromptTemplate::from_template("{input} -> {output}"),
            "{x} ->",
        )
        .example(PromptExample::new("a", "b"));

        assert_eq!(prompt.format(&[("x", "c")]).unwrap(), "a -> b\n\nc ->");
    }
}
