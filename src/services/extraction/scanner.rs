//! Candidate Scanner
//!
//! Finds JSON objects embedded in free text. A candidate is a balanced
//! `{ ... }` span (string-aware, so braces inside JSON strings don't count)
//! that mentions a `"currency"` or `"scopes"` key and parses as JSON.

use std::ops::Range;

use serde_json::Value;
use sow_studio_core::pricing::PricingDocument;

const KEY_TOKENS: [&str; 2] = ["\"currency\"", "\"scopes\""];

/// A parseable JSON span found in the text.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Byte range in the scanned text
    pub range: Range<usize>,
    /// `Some` when the span is a structurally valid pricing document
    pub document: Option<PricingDocument>,
}

/// Exclusive end of the balanced object starting at `start`.
///
/// Returns `None` if `bytes[start]` is not `{` or the object never closes.
pub fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether `span` mentions one of the pricing keys (ASCII case-insensitive).
pub fn has_key_token(span: &str) -> bool {
    let lower = span.to_ascii_lowercase();
    KEY_TOKENS.iter().any(|token| lower.contains(token))
}

/// Scan `text` for candidates, in text order.
///
/// After a valid document the scan resumes at the end of its span, so a
/// document is reported once even though its nested objects are balanced
/// spans too. Anything else (unbalanced, unparseable, or parsed but not a
/// pricing document) resumes one byte later, so wrapper objects and stray
/// braces in prose never hide a document nested inside them.
pub fn scan(text: &str) -> Vec<Candidate> {
    let bytes = text.as_bytes();
    let mut candidates = Vec::new();
    let mut pos = 0;

    while let Some(found) = bytes[pos..].iter().position(|&b| b == b'{') {
        let start = pos + found;
        pos = start + 1;

        let Some(end) = balanced_end(bytes, start) else {
            continue;
        };
        let span = &text[start..end];
        if !has_key_token(span) {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(span) else {
            continue;
        };

        let document = PricingDocument::from_value(&value);
        let is_document = document.is_some();
        candidates.push(Candidate {
            range: start..end,
            document,
        });
        if is_document {
            pos = end;
        }
    }

    candidates
}

/// Merge overlapping ranges; input must be sorted by start.
pub(crate) fn merge_ranges(ranges: impl IntoIterator<Item = Range<usize>>) -> Vec<Range<usize>> {
    let mut merged: Vec<Range<usize>> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Byte ranges of closed triple-backtick fenced blocks, fences included.
pub(crate) fn fenced_blocks(text: &str) -> Vec<Range<usize>> {
    const FENCE: &str = "```";
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(open) = text[pos..].find(FENCE) {
        let open = pos + open;
        let body = open + FENCE.len();
        let Some(close) = text[body..].find(FENCE) else {
            break;
        };
        let end = body + close + FENCE.len();
        blocks.push(open..end);
        pos = end;
    }
    blocks
}

/// Remove `ranges` (sorted, non-overlapping) from `text`.
pub(crate) fn remove_ranges(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in ranges {
        out.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}
