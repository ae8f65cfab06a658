//! Portable Text → HTML.
//!
//! Supported: `block` objects with `normal`/`h1`–`h6`/`blockquote` styles,
//! `bullet`/`number` lists nested by `level`, the standard decorators and
//! `link` annotations. Object blocks of any other `_type` (images, embeds) are
//! skipped. Anything structurally wrong is an error; callers fall back to
//! [`plain_text`].

use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::Value;

use crate::error::RichTextError;
use crate::escape::escape_html;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Block {
    #[serde(default)]
    style: Option<String>,
    children: Vec<Value>,
    #[serde(default)]
    mark_defs: Vec<MarkDef>,
    #[serde(default)]
    list_item: Option<String>,
    #[serde(default)]
    level: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Span {
    text: String,
    #[serde(default)]
    marks: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MarkDef {
    #[serde(rename = "_key")]
    key: String,
    #[serde(rename = "_type")]
    kind: String,
    #[serde(default)]
    href: Option<String>,
}

/// Convert Portable Text blocks to HTML.
pub fn to_html(value: &Value) -> Result<String, RichTextError> {
    let items = match value {
        Value::Null => return Ok(String::new()),
        Value::Array(items) => items,
        other => {
            return Err(RichTextError::NotAnArray {
                found: json_kind(other),
            })
        }
    };

    let mut out = String::new();
    // Open lists, innermost last. Each one has an unclosed <li>.
    let mut lists: Vec<(&'static str, usize)> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or(RichTextError::NotAnObject { index })?;
        let kind = obj
            .get("_type")
            .and_then(Value::as_str)
            .ok_or(RichTextError::MissingType { index })?;
        if kind != "block" {
            tracing::debug!("skipping unsupported rich text block type '{kind}'");
            continue;
        }
        let block: Block = serde_json::from_value(item.clone())
            .map_err(|source| RichTextError::Malformed { index, source })?;
        let inner = render_children(&block, index)?;

        match block.list_item.as_deref() {
            Some(list_item) => {
                let tag = if list_item == "number" { "ol" } else { "ul" };
                let level = block.level.unwrap_or(1).max(1);
                while let Some(&(open_tag, open_level)) = lists.last() {
                    if open_level > level || (open_level == level && open_tag != tag) {
                        let _ = write!(out, "</li></{open_tag}>");
                        lists.pop();
                    } else {
                        break;
                    }
                }
                match lists.last() {
                    Some(&(_, open_level)) if open_level == level => out.push_str("</li><li>"),
                    _ => {
                        let _ = write!(out, "<{tag}><li>");
                        lists.push((tag, level));
                    }
                }
                out.push_str(&inner);
            }
            None => {
                close_lists(&mut out, &mut lists);
                let tag = block_tag(block.style.as_deref());
                let _ = write!(out, "<{tag}>{inner}</{tag}>");
            }
        }
    }
    close_lists(&mut out, &mut lists);
    Ok(out)
}

/// Concatenate the raw text of every span, ignoring structure.
///
/// Never fails: anything that isn't a recognisable text run is ignored.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|block| block.get("children").and_then(Value::as_array))
            .map(|children| {
                children
                    .iter()
                    .filter_map(|c| c.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .collect(),
        _ => String::new(),
    }
}

/// HTML for a rich-text field, degrading to escaped plain text on failure.
pub fn render_or_plain(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match to_html(value) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!("rich text conversion failed, using plain text: {err}");
            escape_html(&plain_text(value))
        }
    }
}

fn render_children(block: &Block, index: usize) -> Result<String, RichTextError> {
    let mut out = String::new();
    for child in &block.children {
        let is_span = match child.get("_type").and_then(Value::as_str) {
            Some(kind) => kind == "span",
            None => child.get("text").is_some(),
        };
        if !is_span {
            continue;
        }
        let span: Span = serde_json::from_value(child.clone())
            .map_err(|source| RichTextError::Malformed { index, source })?;
        out.push_str(&render_span(&span, &block.mark_defs));
    }
    Ok(out)
}

fn render_span(span: &Span, mark_defs: &[MarkDef]) -> String {
    let mut open = String::new();
    let mut close: Vec<&str> = Vec::new();
    for mark in &span.marks {
        let (start, end) = match mark.as_str() {
            "strong" => ("<strong>".to_string(), "</strong>"),
            "em" => ("<em>".to_string(), "</em>"),
            "code" => ("<code>".to_string(), "</code>"),
            "underline" => (
                r#"<span style="text-decoration:underline">"#.to_string(),
                "</span>",
            ),
            "strike-through" => ("<del>".to_string(), "</del>"),
            key => match mark_defs.iter().find(|d| d.key == key) {
                Some(def) if def.kind == "link" => match def.href.as_deref() {
                    Some(href) if uri_looks_safe(href) => {
                        (format!(r#"<a href="{}">"#, escape_html(href.trim())), "</a>")
                    }
                    Some(href) => {
                        tracing::warn!("dropping link with unsafe href '{href}'");
                        continue;
                    }
                    None => continue,
                },
                _ => continue,
            },
        };
        open.push_str(&start);
        close.push(end);
    }
    let text = escape_html(&span.text).replace('\n', "<br/>");
    let closing: String = close.iter().rev().copied().collect();
    format!("{open}{text}{closing}")
}

/// Relative URLs, fragments and the `http`, `https`, `mailto` and `tel`
/// schemes. Anything else (`javascript:`, `data:`, `vbscript:`) renders as text.
fn uri_looks_safe(href: &str) -> bool {
    let href = href.trim();
    if href.starts_with('#') {
        return true;
    }
    let scheme_end = href.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if href[i..].starts_with(':') => {
            let scheme = href[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel")
        }
        _ => !href.chars().any(char::is_control),
    }
}

fn block_tag(style: Option<&str>) -> &'static str {
    match style {
        Some("h1") => "h1",
        Some("h2") => "h2",
        Some("h3") => "h3",
        Some("h4") => "h4",
        Some("h5") => "h5",
        Some("h6") => "h6",
        Some("blockquote") => "blockquote",
        _ => "p",
    }
}

fn close_lists(out: &mut String, lists: &mut Vec<(&'static str, usize)>) {
    while let Some((tag, _)) = lists.pop() {
        let _ = write!(out, "</li></{tag}>");
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
