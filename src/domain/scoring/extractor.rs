//! JSON extraction from raw model output.
//!
//! Generated text is untrusted: it may be wrapped in a code fence, preceded
//! by prose, split across several objects, or cut off mid-object when the
//! generation budget runs out. Extraction never fails; finding nothing is a
//! normal outcome reported as `None`.

use std::collections::VecDeque;

use serde_json::{Map, Value};

/// Number of structural cut points kept for truncation repair.
const MAX_REPAIR_CUTS: usize = 32;

/// The fixed set of keys recovered from model output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedResponse {
    pub sections: Option<Value>,
    pub timeline_markers: Option<Value>,
    pub overall_comments: Option<String>,
    pub transcript: Option<Value>,
}

impl ExtractedResponse {
    pub fn is_empty(&self) -> bool {
        self.sections.is_none()
            && self.timeline_markers.is_none()
            && self.overall_comments.is_none()
            && self.transcript.is_none()
    }

    /// Merges one parsed object; later objects overwrite earlier ones per key.
    fn merge(&mut self, obj: &Map<String, Value>) {
        if let Some(sections) = obj.get("sections").filter(|v| is_truthy(v)) {
            self.sections = Some(sections.clone());
        }
        if let Some(markers) = obj.get("timeline_markers").filter(|v| !v.is_null()) {
            self.timeline_markers = Some(markers.clone());
        }
        let comments = ["overallComments", "overall_comments"]
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty());
        if let Some(comments) = comments {
            self.overall_comments = Some(comments.to_string());
        }
        if let Some(transcript) = obj.get("transcript").filter(|v| !v.is_null()) {
            self.transcript = Some(transcript.clone());
        }
    }
}

/// Recovers the scoring payload from raw generated text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts and merges every recoverable JSON object in `raw`.
    ///
    /// # Steps
    /// 1. Strip a leading code fence (the closing fence may be missing)
    /// 2. Scan left to right for `{` and find each matching close
    /// 3. Repair an object cut off at end of input by closing what is open
    /// 4. If no `sections` were found, locate the `"sections"` key directly
    ///    and recover just its value
    pub fn extract(&self, raw: &str) -> Option<ExtractedResponse> {
        let text = strip_code_fence(raw);
        let mut merged = ExtractedResponse::default();

        let mut pos = 0;
        while let Some(offset) = text[pos..].find('{') {
            let start = pos + offset;
            match scan_value(text, start) {
                Scan::Complete(end) => {
                    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(&text[start..end]) {
                        merged.merge(&obj);
                    }
                    pos = end;
                }
                Scan::Truncated(state) => {
                    match repair_truncated(text, start, &state) {
                        Some(Value::Object(obj)) => merged.merge(&obj),
                        _ => tracing::debug!(start, "abandoning unrepairable truncated object"),
                    }
                    break;
                }
            }
        }

        if merged.sections.is_none() {
            if let Some(sections) = self.sections_from_key(text) {
                tracing::debug!("recovered sections by key lookup");
                merged.sections = Some(sections);
            }
        }

        (!merged.is_empty()).then_some(merged)
    }

    /// Finds a literal `"sections"` key and recovers its object value,
    /// repairing truncation scoped to that value.
    ///
    /// Occurrences are tried last to first: a truncated document is usually
    /// the final one, and earlier hits may sit inside prose.
    fn sections_from_key(&self, text: &str) -> Option<Value> {
        text.rmatch_indices("\"sections\"")
            .chain(text.rmatch_indices("'sections'"))
            .find_map(|(key, _)| sections_value_at(text, key))
    }
}

fn sections_value_at(text: &str, key: usize) -> Option<Value> {
    let colon = key + text[key..].find(':')?;
    let after = &text[colon + 1..];
    let start = colon + 1 + (after.len() - after.trim_start().len());
    if !text[start..].starts_with('{') {
        return None;
    }

    let value = match scan_value(text, start) {
        Scan::Complete(end) => serde_json::from_str::<Value>(&text[start..end]).ok(),
        Scan::Truncated(state) => repair_truncated(text, start, &state),
    }?;
    match &value {
        Value::Object(obj) if !obj.is_empty() => Some(value),
        _ => None,
    }
}

/// Recovers the first JSON object in generated text.
///
/// Fences and leading prose are skipped; an object cut off at end of input
/// is repaired the same way as in [`ResponseExtractor::extract`]. Later
/// objects are ignored.
pub fn recover_first_object(raw: &str) -> Option<Map<String, Value>> {
    let text = strip_code_fence(raw);
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let value = match scan_value(text, start) {
            Scan::Complete(end) => {
                pos = end;
                serde_json::from_str::<Value>(&text[start..end]).ok()
            }
            Scan::Truncated(state) => {
                pos = text.len();
                repair_truncated(text, start, &state)
            }
        };
        if let Some(Value::Object(obj)) = value {
            return Some(obj);
        }
    }
    None
}

/// Removes a leading ```` ``` ```` / ```` ```json ```` fence and a trailing fence if present.
pub fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        s = s.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Python-style truthiness used when deciding whether a key was "returned".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

enum Scan {
    /// Byte offset one past the matching close.
    Complete(usize),
    Truncated(OpenState),
}

/// Parser state at end of input for a value that never closed.
struct OpenState {
    stack: Vec<u8>,
    in_string: bool,
    escaped: bool,
    /// Most recent positions where the prefix can be cut and closed,
    /// with the open stack at that point.
    cuts: VecDeque<(usize, Vec<u8>)>,
}

/// Walks from the opening brace at `start`, tracking strings and nesting.
///
/// Only ASCII bytes are inspected, so every recorded offset is a char boundary.
fn scan_value(text: &str, start: usize) -> Scan {
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut cuts: VecDeque<(usize, Vec<u8>)> = VecDeque::new();

    let mut push_cut = |cuts: &mut VecDeque<(usize, Vec<u8>)>, at: usize, stack: &[u8]| {
        if cuts.len() == MAX_REPAIR_CUTS {
            cuts.pop_front();
        }
        cuts.push_back((at, stack.to_vec()));
    };

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                stack.push(b);
                push_cut(&mut cuts, i + 1, &stack);
            }
            b'}' | b']' => {
                stack.pop();
                if stack.is_empty() {
                    return Scan::Complete(i + 1);
                }
            }
            b',' => push_cut(&mut cuts, i, &stack),
            _ => {}
        }
    }

    Scan::Truncated(OpenState {
        stack,
        in_string,
        escaped,
        cuts,
    })
}

/// Closes a truncated value and parses it.
///
/// First tries the whole fragment (closing an open string, dropping
/// dangling commas, then closing every open brace/bracket). If that does
/// not parse, retries from the most recent structural cut points backwards.
fn repair_truncated(text: &str, start: usize, state: &OpenState) -> Option<Value> {
    let mut fragment = text[start..].to_string();
    if state.in_string {
        if state.escaped {
            fragment.pop();
        }
        fragment.push('"');
    }
    if let Some(value) = close_and_parse(&fragment, &state.stack) {
        return Some(value);
    }

    state
        .cuts
        .iter()
        .rev()
        .find_map(|(at, stack)| close_and_parse(&text[start..*at], stack))
}

fn close_and_parse(fragment: &str, stack: &[u8]) -> Option<Value> {
    let mut candidate = fragment.trim_end().to_string();
    while candidate.ends_with(',') {
        candidate.pop();
        candidate.truncate(candidate.trim_end().len());
    }
    for opener in stack.iter().rev() {
        candidate.push(if *opener == b'[' { ']' } else { '}' });
    }
    serde_json::from_str(&candidate).ok()
}
