//! `{tagName}` references inside node text.
//!
//! Node content and descriptions may mention palette tags by wrapping the
//! tag name in braces. This module finds those references (with `winnow`),
//! renders them as highlight spans, offers autocomplete while typing, and
//! manages the palette itself.

use crate::model::{TAG_COLORS, Tag};
use winnow::combinator::delimited;
use winnow::prelude::*;
use winnow::token::take_till;

// ─── Scanning ────────────────────────────────────────────────────────────

/// A piece of scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text between references.
    Text(&'a str),
    /// A `{name}` reference. `raw` includes the braces.
    Reference { name: &'a str, raw: &'a str },
}

/// `{` name `}` where the name is at least one character and contains no `}`.
fn tag_reference<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited('{', take_till(1.., '}'), '}').parse_next(input)
}

/// Split `text` into plain runs and `{name}` references, in order.
/// Concatenating every segment's text reproduces the input.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut offset = 0;

    while let Some(rel) = text[offset..].find('{') {
        let open = offset + rel;
        let mut cursor = &text[open..];
        match tag_reference.parse_next(&mut cursor) {
            Ok(name) => {
                let end = text.len() - cursor.len();
                if open > plain_start {
                    segments.push(Segment::Text(&text[plain_start..open]));
                }
                segments.push(Segment::Reference {
                    name,
                    raw: &text[open..end],
                });
                plain_start = end;
                offset = end;
            }
            Err(_) => offset = open + 1,
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Text(&text[plain_start..]));
    }
    segments
}

/// Names referenced in `text`, in order of appearance (duplicates kept).
pub fn referenced_names(text: &str) -> impl Iterator<Item = &str> {
    scan(text).into_iter().filter_map(|s| match s {
        Segment::Reference { name, .. } => Some(name),
        Segment::Text(_) => None,
    })
}

// ─── Highlighting ────────────────────────────────────────────────────────

/// Render `text` with every reference to a known tag replaced by a
/// `tag-highlight` span. Unknown references are left verbatim.
pub fn highlight_html(text: &str, tags: &[Tag]) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in scan(text) {
        match segment {
            Segment::Text(t) => out.push_str(t),
            Segment::Reference { name, raw } => match tags.iter().find(|t| t.name == name) {
                Some(tag) => {
                    out.push_str(&format!(
                        "<span class=\"tag-highlight\" data-tag-id=\"{}\" data-tag-name=\"{}\" \
                         data-tag-description=\"{}\" data-tag-color=\"{}\">{{{}}}</span>",
                        escape_attr(&tag.id),
                        escape_attr(&tag.name),
                        escape_attr(tag.description.as_deref().unwrap_or_default()),
                        escape_attr(&tag.color),
                        escape_attr(&tag.name),
                    ));
                }
                None => out.push_str(raw),
            },
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

// ─── Autocomplete ────────────────────────────────────────────────────────

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion<'a> {
    pub label: &'a str,
    /// Text to insert, braces included.
    pub value: String,
    pub description: Option<&'a str>,
    pub color: &'a str,
}

/// Autocomplete result: candidates plus the byte range they replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions<'a> {
    pub items: Vec<Suggestion<'a>>,
    pub start: usize,
    pub end: usize,
}

/// Suggest palette tags for an unclosed `{query` ending at `cursor`
/// (a byte offset into `text`). Matching is a case-insensitive substring
/// test on the tag name. Returns `None` when the cursor is not inside an
/// open reference or is not on a char boundary.
pub fn suggest<'a>(text: &str, cursor: usize, tags: &'a [Tag]) -> Option<Suggestions<'a>> {
    let before = text.get(..cursor)?;
    let tail_start = before.rfind('}').map_or(0, |p| p + 1);
    let open = tail_start + before[tail_start..].find('{')?;
    let query = &before[open + 1..];
    let needle = query.to_lowercase();

    let items = tags
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .map(|t| Suggestion {
            label: &t.name,
            value: format!("{{{}}}", t.name),
            description: t.description.as_deref(),
            color: &t.color,
        })
        .collect();

    Some(Suggestions {
        items,
        start: cursor - query.len(),
        end: cursor,
    })
}

// ─── Palette management ──────────────────────────────────────────────────

/// Add a tag named `name` (trimmed). Rejects empty and duplicate names.
/// Colors are assigned round-robin from `TAG_COLORS`.
pub fn add_tag<'a>(tags: &'a mut Vec<Tag>, name: &str) -> Option<&'a Tag> {
    let name = name.trim();
    if name.is_empty() || tags.iter().any(|t| t.name == name) {
        return None;
    }
    let color = TAG_COLORS[tags.len() % TAG_COLORS.len()];
    tags.push(Tag::new(uuid::Uuid::new_v4().to_string(), name, color));
    log::debug!("added tag `{name}` ({color})");
    tags.last()
}

/// Remove the tag with `id`. Returns whether anything was removed.
pub fn remove_tag(tags: &mut Vec<Tag>, id: &str) -> bool {
    let before = tags.len();
    tags.retain(|t| t.id != id);
    tags.len() != before
}

/// Replace the tag sharing `updated.id`. Returns false if no such tag.
pub fn update_tag(tags: &mut [Tag], updated: Tag) -> bool {
    match tags.iter_mut().find(|t| t.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}
