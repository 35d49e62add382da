//! Root template engine.
//!
//! The root document is parsed once into literal text and `{{ ... }}` tags:
//!
//! ```text
//! {{ inertia }}            value lookup (a leading `.` is accepted)
//! {{ vite "main.ts" }}     template function call with string arguments
//! ```
//!
//! Text values are HTML-escaped, HTML values are inserted as-is, JSON values
//! are escaped as text. Template functions return raw HTML.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{BoxError, TemplateError};

/// A value available to the root template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// Escaped on output.
    Text(String),
    /// Trusted markup, written verbatim.
    Html(String),
    /// Structured data, written as escaped JSON text.
    Json(Value),
}

impl TemplateValue {
    pub fn html(markup: impl Into<String>) -> Self {
        Self::Html(markup.into())
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Self::Text(text) => escape_html_into(text, out),
            Self::Html(markup) => out.push_str(markup),
            Self::Json(Value::String(text)) => escape_html_into(text, out),
            Self::Json(value) => escape_html_into(&value.to_string(), out),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for TemplateValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Data handed to the root template.
pub type TemplateData = HashMap<String, TemplateValue>;

/// A template function: string arguments in, raw HTML out.
pub type TemplateFn = Arc<dyn Fn(&[String]) -> Result<String, BoxError> + Send + Sync>;

pub type TemplateFuncs = HashMap<String, TemplateFn>;

/// Pluggable root document renderer.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, data: &TemplateData, funcs: &TemplateFuncs) -> Result<String, BoxError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Lookup(String),
    Call { name: String, args: Vec<String> },
}

/// A parsed root template.
#[derive(Debug, Clone)]
pub struct RootTemplate {
    segments: Vec<Segment>,
}

impl RootTemplate {
    pub fn parse(src: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(found) = src[pos..].find("{{") {
            let open = pos + found;
            if open > pos {
                segments.push(Segment::Literal(src[pos..open].to_string()));
            }

            let inner_start = open + 2;
            let close = src[inner_start..]
                .find("}}")
                .map(|i| inner_start + i)
                .ok_or(TemplateError::Unterminated(open))?;

            segments.push(parse_tag(&src[inner_start..close], open)?);
            pos = close + 2;
        }

        if pos < src.len() {
            segments.push(Segment::Literal(src[pos..].to_string()));
        }

        Ok(Self { segments })
    }

    pub fn render(
        &self,
        data: &TemplateData,
        funcs: &TemplateFuncs,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Lookup(name) => {
                    if let Some(value) = data.get(name) {
                        value.write_to(&mut out);
                    } else if let Some(func) = funcs.get(name) {
                        out.push_str(&call(name, func, &[])?);
                    }
                }
                Segment::Call { name, args } => {
                    let func = funcs
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownFunction(name.clone()))?;
                    out.push_str(&call(name, func, args)?);
                }
            }
        }

        Ok(out)
    }
}

impl TemplateRenderer for RootTemplate {
    fn render(&self, data: &TemplateData, funcs: &TemplateFuncs) -> Result<String, BoxError> {
        RootTemplate::render(self, data, funcs).map_err(Into::into)
    }
}

fn call(name: &str, func: &TemplateFn, args: &[String]) -> Result<String, TemplateError> {
    func(args).map_err(|source| TemplateError::Function {
        name: name.to_string(),
        source,
    })
}

fn parse_tag(body: &str, offset: usize) -> Result<Segment, TemplateError> {
    let body = body.trim();
    let (name, rest) = match body.find(char::is_whitespace) {
        Some(i) => (&body[..i], body[i..].trim_start()),
        None => (body, ""),
    };
    let name = name.strip_prefix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(TemplateError::EmptyTag(offset));
    }

    if rest.is_empty() {
        return Ok(Segment::Lookup(name.to_string()));
    }

    let args = parse_args(rest).map_err(|arg| TemplateError::InvalidArgument {
        name: name.to_string(),
        arg,
    })?;

    Ok(Segment::Call {
        name: name.to_string(),
        args,
    })
}

/// Split `"a" "b \"c\""` into its string arguments. Returns the offending
/// text on anything that is not a quoted string.
fn parse_args(src: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut chars = src.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.next() {
            None => return Ok(args),
            Some('"') => {}
            Some(other) => {
                let mut bad = other.to_string();
                bad.extend(chars.by_ref().take_while(|c| !c.is_whitespace()));
                return Err(bad);
            }
        }

        let mut arg = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    closed = true;
                    break;
                }
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        arg.push(escaped);
                    }
                }
                _ => arg.push(c),
            }
        }

        if !closed {
            return Err(format!("\"{arg}"));
        }
        args.push(arg);
    }
}

/// HTML-escape text for element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

fn escape_html_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
