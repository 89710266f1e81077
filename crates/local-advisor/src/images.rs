//! Dish Image Agent
//!
//! A ReAct agent with one tool, `DishImageSearch`. The tool is
//! `return_direct`, so a well-behaved run ends with the tool's URL list as
//! structured data. When the model answers on its own instead, the final
//! answer text is parsed as a JSON array, then as a list literal.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use agent_core::{Agent, AgentBuilder, LlmProvider};
use serde_json::Value;

use crate::error::Result;
use crate::photos::ImageSearch;
use crate::svckit::DishImageSearchTool;
use crate::{DISH_IMAGE_AGENT_PROMPT, IMAGE_AGENT_MODEL};

/// Image agent settings
#[derive(Clone, Debug)]
pub struct ImageAgentConfig {
    pub model: String,
    pub temperature: f32,
    pub max_iterations: usize,
}

impl Default for ImageAgentConfig {
    fn default() -> Self {
        Self {
            model: IMAGE_AGENT_MODEL.into(),
            temperature: 0.3,
            max_iterations: 15,
        }
    }
}

pub struct DishImageAgent {
    agent: Agent,
}

impl DishImageAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn ImageSearch>,
        config: &ImageAgentConfig,
    ) -> Result<Self> {
        let agent = AgentBuilder::new()
            .provider(provider)
            .tool(DishImageSearchTool::new(search))
            .prompt(DISH_IMAGE_AGENT_PROMPT)
            .model(config.model.clone())
            .temperature(config.temperature)
            .max_iterations(config.max_iterations)
            .handle_parsing_errors(true)
            .build()?;

        Ok(Self { agent })
    }

    /// Question handed to the agent
    pub fn instruction(dish: &str) -> String {
        format!("\nYou MUST use the DishImageSearch tool.\n\nDish name:\n{dish}\n")
    }

    /// Run the agent and normalize its output
    pub async fn fetch(&self, dish: &str) -> Result<Vec<String>> {
        let output = self.agent.invoke(&Self::instruction(dish)).await?;
        tracing::debug!(steps = output.steps.len(), output = %output.output, "Image agent finished");
        Ok(normalize_image_output(&output.output))
    }

    /// Image URLs for a dish; failures are logged and yield an empty list
    pub async fn fetch_dish_images(&self, dish: &str) -> Vec<String> {
        match self.fetch(dish).await {
            Ok(images) => {
                tracing::info!(dish = %dish, count = images.len(), "Fetched dish images");
                images
            }
            Err(e) => {
                tracing::warn!(dish = %dish, error = %e, "Image agent failed, returning no images");
                Vec::new()
            }
        }
    }
}

/// Coerce agent output into a list of URL strings.
///
/// Strings are parsed as a list; anything that is not a list, or does not
/// parse, yields an empty list. Non-string elements are dropped.
pub fn normalize_image_output(output: &Value) -> Vec<String> {
    let items = match output {
        Value::Array(items) => items.clone(),
        Value::String(text) => parse_list_literal(text).unwrap_or_default(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url),
            _ => None,
        })
        .collect()
}

/// Parse a JSON array, or a list literal as a Python `repr` would print it:
/// single or double quotes with `u`/`r`/`b` prefixes and the usual escapes,
/// tuples, sets and dicts as elements, hex/octal/binary integers and
/// `None`/`True`/`False`. Returns `None` unless the whole text is one list.
pub fn parse_list_literal(text: &str) -> Option<Vec<Value>> {
    let text = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return match value {
            Value::Array(items) => Some(items),
            _ => None,
        };
    }

    let mut parser = ListLiteral {
        chars: text.chars().peekable(),
    };
    parser.chars.next_if_eq(&'[')?;
    let (items, _) = parser.items(']')?;
    parser.skip_whitespace();
    parser.chars.peek().is_none().then_some(items)
}

struct ListLiteral<'a> {
    chars: Peekable<Chars<'a>>,
}

impl ListLiteral<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.chars.next_if(|c| matches!(*c, '[' | '(' | '{')) {
            Some('[') => return self.items(']').map(|(items, _)| Value::Array(items)),
            Some('(') => return self.tuple(),
            Some(_) => return self.dict_or_set(),
            None => {}
        }
        match *self.chars.peek()? {
            '\'' | '"' => self.string(false).map(Value::String),
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            c if c.is_alphabetic() => self.word(),
            _ => None,
        }
    }

    /// Comma-separated values up to `close`, which is consumed. The flag
    /// tells whether any comma was seen.
    fn items(&mut self, close: char) -> Option<(Vec<Value>, bool)> {
        let mut items = Vec::new();
        let mut comma = false;
        loop {
            self.skip_whitespace();
            if self.chars.next_if_eq(&close).is_some() {
                return Some((items, comma));
            }
            items.push(self.value()?);
            self.skip_whitespace();
            match self.chars.next()? {
                ',' => comma = true,
                c if c == close => return Some((items, comma)),
                _ => return None,
            }
        }
    }

    /// `(x)` is just `x`; `(x,)` and `(x, y)` are tuples.
    fn tuple(&mut self) -> Option<Value> {
        let (mut items, comma) = self.items(')')?;
        if items.len() == 1 && !comma {
            return items.pop();
        }
        Some(Value::Array(items))
    }

    fn dict_or_set(&mut self) -> Option<Value> {
        self.skip_whitespace();
        if self.chars.next_if_eq(&'}').is_some() {
            return Some(Value::Object(serde_json::Map::new()));
        }

        let first = self.value()?;
        self.skip_whitespace();
        if self.chars.next_if_eq(&':').is_none() {
            let mut items = vec![first];
            match self.chars.next()? {
                ',' => items.extend(self.items('}')?.0),
                '}' => {}
                _ => return None,
            }
            return Some(Value::Array(items));
        }

        let mut map = serde_json::Map::new();
        let mut key = first;
        loop {
            let value = self.value()?;
            let name = match key {
                Value::String(s) => s,
                other => other.to_string(),
            };
            map.insert(name, value);

            self.skip_whitespace();
            match self.chars.next()? {
                ',' => {}
                '}' => return Some(Value::Object(map)),
                _ => return None,
            }
            self.skip_whitespace();
            if self.chars.next_if_eq(&'}').is_some() {
                return Some(Value::Object(map));
            }
            let next = self.value()?;
            self.skip_whitespace();
            self.chars.next_if_eq(&':')?;
            key = next;
        }
    }

    fn string(&mut self, raw: bool) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                c if c == quote => return Some(out),
                '\n' => return None,
                '\\' if raw => {
                    out.push('\\');
                    out.push(self.chars.next()?);
                }
                '\\' => match self.chars.next()? {
                    '\n' => {}
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    'f' => out.push('\u{0c}'),
                    'v' => out.push('\u{0b}'),
                    'x' => out.push(self.code_point(2, 16)?),
                    'u' => out.push(self.code_point(4, 16)?),
                    'U' => out.push(self.code_point(8, 16)?),
                    d @ '0'..='7' => out.push(self.octal(d)?),
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }

    fn code_point(&mut self, digits: usize, radix: u32) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            code = code * radix + self.chars.next()?.to_digit(radix)?;
        }
        char::from_u32(code)
    }

    /// Up to three octal digits, the first already read
    fn octal(&mut self, first: char) -> Option<char> {
        let mut code = first.to_digit(8)?;
        for _ in 0..2 {
            match self.chars.next_if(|c| c.is_digit(8)) {
                Some(d) => code = code * 8 + d.to_digit(8)?,
                None => break,
            }
        }
        char::from_u32(code)
    }

    fn number(&mut self) -> Option<Value> {
        let mut raw = String::new();
        while let Some(c) = self
            .chars
            .next_if(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '+' | '.' | '_'))
        {
            if c != '_' {
                raw.push(c);
            }
        }

        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(&raw)),
        };
        if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }

        let radix = match unsigned.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("0x") => 16,
            Some("0o") => 8,
            Some("0b") => 2,
            _ => 10,
        };
        if radix != 10 {
            let digits = &unsigned[2..];
            if digits.starts_with(['+', '-']) {
                return None;
            }
            let int = i64::from_str_radix(digits, radix).ok()?;
            return Some(Value::from(if negative { -int } else { int }));
        }

        if let Ok(int) = unsigned.parse::<i64>() {
            return Some(Value::from(if negative { -int } else { int }));
        }
        unsigned
            .parse::<f64>()
            .ok()
            .map(|f| if negative { -f } else { f })
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    }

    fn word(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
            word.push(c);
        }

        if matches!(self.chars.peek(), Some('\'' | '"')) {
            let prefix = word.to_ascii_lowercase();
            if !matches!(prefix.as_str(), "u" | "r" | "b" | "rb" | "br") {
                return None;
            }
            let text = self.string(prefix.contains('r'))?;
            if !prefix.contains('b') {
                return Some(Value::String(text));
            }
            // bytes are not text; keep them as a list of byte values
            return text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok().map(Value::from))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array);
        }

        match word.as_str() {
            "None" | "null" => Some(Value::Null),
            "True" | "true" => Some(Value::Bool(true)),
            "False" | "false" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::MockImageSearch;
    use agent_runtime::ScriptedProvider;
    use serde_json::json;

    #[test]
    fn test_normalize_single_quoted_list() {
        assert_eq!(
            normalize_image_output(&json!("['a.jpg','b.jpg']")),
            vec!["a.jpg", "b.jpg"]
        );
    }

    #[test]
    fn test_normalize_plain_text() {
        assert!(normalize_image_output(&json!("no images found")).is_empty());
        assert!(normalize_image_output(&json!("")).is_empty());
    }

    #[test]
    fn test_normalize_drops_non_strings() {
        assert_eq!(normalize_image_output(&json!(["x.jpg", 42, null])), vec!["x.jpg"]);
        assert_eq!(
            normalize_image_output(&json!("['x.jpg', 42, None, ['nested.jpg'], True]")),
            vec!["x.jpg"]
        );
    }

    #[test]
    fn test_normalize_non_list() {
        assert!(normalize_image_output(&json!({"images": ["a.jpg"]})).is_empty());
        assert!(normalize_image_output(&json!("'a.jpg'")).is_empty());
        assert!(normalize_image_output(&json!(7)).is_empty());
    }

    #[test]
    fn test_parse_list_literal() {
        assert_eq!(
            parse_list_literal(r#" ["https://x/1", "https://x/2"] "#),
            Some(vec![json!("https://x/1"), json!("https://x/2")])
        );
        assert_eq!(
            parse_list_literal("[1, -2.5, 'it\\'s', [], ]"),
            Some(vec![json!(1), json!(-2.5), json!("it's"), json!([])])
        );
        assert_eq!(parse_list_literal("['a.jpg'] trailing"), None);
        assert_eq!(parse_list_literal("['unterminated]"), None);
        assert_eq!(parse_list_literal("[,]"), None);
        assert_eq!(parse_list_literal("[undefined]"), None);
    }

    #[test]
    fn test_normalize_prefixed_strings() {
        assert_eq!(
            normalize_image_output(&json!("[u'https://x/1.jpg', u'https://x/2.jpg']")),
            vec!["https://x/1.jpg", "https://x/2.jpg"]
        );
        assert_eq!(
            normalize_image_output(&json!(r"[r'C:\dir\a.jpg', U'b.jpg', b'c.jpg', Rb'd.jpg']")),
            vec![r"C:\dir\a.jpg", "b.jpg"]
        );
        assert!(normalize_image_output(&json!("[f'a.jpg']")).is_empty());
    }

    #[test]
    fn test_normalize_skips_containers() {
        assert_eq!(normalize_image_output(&json!("['a.jpg', {'url': 'b.jpg'}]")), vec!["a.jpg"]);
        assert_eq!(normalize_image_output(&json!("['a.jpg', ('b.jpg',)]")), vec!["a.jpg"]);
        assert_eq!(normalize_image_output(&json!("['a.jpg', {'b.jpg', 'c.jpg'}, {}]")), vec!["a.jpg"]);
        assert_eq!(normalize_image_output(&json!("['a.jpg', 0x1f, -0o7, 0b101, 1e-3]")), vec!["a.jpg"]);
    }

    #[test]
    fn test_normalize_escapes() {
        assert_eq!(normalize_image_output(&json!("['caf\\u00e9.jpg']")), vec!["café.jpg"]);
        assert_eq!(
            normalize_image_output(&json!("['\\x41\\101\\U0001F35C.jpg', 'tab\\there']")),
            vec!["AA\u{1F35C}.jpg", "tab\there"]
        );
        assert!(normalize_image_output(&json!("['\\xZZ.jpg']")).is_empty());
    }

    #[test]
    fn test_parse_containers_and_numbers() {
        assert_eq!(
            parse_list_literal("[('a', 1), ('solo'), (), {'k': None, 2: True}, {3, 4}]"),
            Some(vec![
                json!(["a", 1]),
                json!("solo"),
                json!([]),
                json!({"k": null, "2": true}),
                json!([3, 4]),
            ])
        );
        assert_eq!(
            parse_list_literal("[0x1F, 0o17, 0b11, -0xff, 1_000, 2.5e2, +3, b'hi']"),
            Some(vec![
                json!(31),
                json!(15),
                json!(3),
                json!(-255),
                json!(1000),
                json!(250.0),
                json!(3),
                json!([104, 105]),
            ])
        );
        assert_eq!(parse_list_literal("[{'a' 1}]"), None);
        assert_eq!(parse_list_literal("[(1, 2]"), None);
        assert_eq!(parse_list_literal("[--1]"), None);
        assert_eq!(parse_list_literal("[-inf]"), None);
    }

    fn agent(provider: Arc<ScriptedProvider>, search: Arc<MockImageSearch>) -> DishImageAgent {
        DishImageAgent::new(provider, search, &ImageAgentConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_tool_result_is_returned_directly() {
        let provider = Arc::new(ScriptedProvider::new([
            "Thought: I should search.\nAction: DishImageSearch\nAction Input: Pad Thai",
        ]));
        let search = Arc::new(MockImageSearch::new(["a.jpg", "b.jpg", "c.jpg"]));
        let agent = agent(provider.clone(), search.clone());

        let images = agent.fetch_dish_images("Pad Thai").await;
        assert_eq!(images, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(search.queries(), vec!["Pad Thai"]);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("You MUST use the DishImageSearch tool.\n\nDish name:\nPad Thai\n"));
        assert_eq!(requests[0].model, IMAGE_AGENT_MODEL);
    }

    #[tokio::test]
    async fn test_final_answer_text_is_normalized() {
        let provider = Arc::new(ScriptedProvider::new([
            "Thought: I know this.\nFinal Answer: ['x.jpg', 42]",
        ]));
        let agent = agent(provider, Arc::new(MockImageSearch::default()));

        assert_eq!(agent.fetch_dish_images("Ramen").await, vec!["x.jpg"]);
    }

    #[tokio::test]
    async fn test_search_failure_then_give_up() {
        let provider = Arc::new(ScriptedProvider::new([
            "Action: DishImageSearch\nAction Input: Ramen",
            "Thought: The search failed.\nFinal Answer: no images found",
        ]));
        let agent = agent(provider.clone(), Arc::new(MockImageSearch::failing(401)));

        assert!(agent.fetch_dish_images("Ramen").await.is_empty());
        let requests = provider.requests();
        assert!(requests[1].prompt.contains("Observation: Error: "));
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_empty() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let agent = agent(provider, Arc::new(MockImageSearch::default()));

        assert!(agent.fetch("Ramen").await.is_err());
        assert!(agent.fetch_dish_images("Ramen").await.is_empty());
    }
}
