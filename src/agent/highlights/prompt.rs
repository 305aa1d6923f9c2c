// SYNOID Highlight Prompt
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Builds the schema-constrained completion request and reads candidates
// back out of whatever the model returned.

use super::limits::LengthLimits;
use super::strategy::HighlightStrategy;
use super::HighlightRange;
use crate::agent::gpt_oss_bridge::CompletionRequest;
use crate::agent::transcription::TranscriptSegment;
use regex::Regex;
use serde_json::{json, Value};
use std::fmt::Write;
use std::sync::OnceLock;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are SYNOID's highlight editor. You pick self-contained moments \
from long-form transcripts that work as short vertical clips. Reply with JSON only.";

static JSON_BLOCK: OnceLock<Regex> = OnceLock::new();

/// Inputs that shape the prompt for one selection call.
pub struct PromptInput<'a> {
    pub segments: &'a [TranscriptSegment],
    pub limits: &'a LengthLimits,
    pub language: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub description: Option<&'a str>,
    pub exclude: &'a [HighlightRange],
    pub requested: usize,
    pub minimum: usize,
}

/// A candidate range as proposed by the model, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub start: f64,
    pub end: f64,
    pub title: Option<String>,
}

pub fn build_request(input: &PromptInput<'_>, strategy: &HighlightStrategy) -> CompletionRequest {
    CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: user_prompt(input),
        response_format: response_format(input.minimum, input.requested),
        max_tokens: strategy.completion_tokens(input.requested),
    }
}

fn user_prompt(input: &PromptInput<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Select between {} and {} highlights from the transcript below.\n",
        input.minimum, input.requested
    );
    out.push_str("Rules:\n");
    out.push_str("- Open every highlight on a hook that lands within the first 1-2 seconds.\n");
    let _ = writeln!(
        out,
        "- Each highlight lasts between {:.0} and {:.0} seconds.",
        input.limits.min_length, input.limits.max_length
    );
    out.push_str("- Start and end on complete sentences. Never cut a sentence in half.\n");
    out.push_str("- Highlights must not overlap each other.\n");
    match input.language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => {
            let _ = writeln!(out, "- Write every title in {}.", language);
        }
        None => out.push_str("- Write every title in the same language as the transcript.\n"),
    }
    if !input.exclude.is_empty() {
        let ranges: Vec<String> = input
            .exclude
            .iter()
            .map(|r| format!("{:.2}-{:.2}", r.start, r.end))
            .collect();
        let _ = writeln!(out, "- Avoid these ranges, they are already used: {}.", ranges.join(", "));
    }
    if let Some(description) = input.description.map(str::trim).filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "\nAbout this video: {}", description);
    }
    if let Some(instructions) = input.instructions.map(str::trim).filter(|i| !i.is_empty()) {
        let _ = writeln!(out, "\nExtra instructions: {}", instructions);
    }

    out.push_str("\nTranscript (start - end: text):\n");
    out.push_str(&transcript_lines(input.segments));
    out
}

/// `start - end: text`, one segment per line.
pub fn transcript_lines(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("{:.2} - {:.2}: {}", s.start, s.end, s.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn response_format(minimum: usize, requested: usize) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "highlights",
            "strict": true,
            "schema": {
                "type": "object",
                "additionalProperties": false,
                "required": ["highlights"],
                "properties": {
                    "highlights": {
                        "type": "array",
                        "minItems": minimum,
                        "maxItems": requested,
                        "items": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["start", "end", "title"],
                            "properties": {
                                "start": { "type": "number" },
                                "end": { "type": "number" },
                                "title": { "type": "string" }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Candidates from the completion content. Unreadable content yields none.
pub fn parse_candidates(content: &str) -> Vec<RawCandidate> {
    let Some(value) = parse_json(content) else {
        warn!("[LLM] Completion content is not JSON; continuing with zero candidates");
        return Vec::new();
    };

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("highlights") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("[LLM] Completion JSON has no `highlights` array");
                return Vec::new();
            }
        },
        _ => return Vec::new(),
    };

    items.iter().filter_map(candidate_from).collect()
}

fn parse_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    let block = JSON_BLOCK
        .get_or_init(|| Regex::new(r"(?s)\{.*\}|\[.*\]").expect("JSON block pattern is valid"));
    block
        .find(trimmed)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
}

fn candidate_from(value: &Value) -> Option<RawCandidate> {
    let start = number_field(value, "start")?;
    let end = number_field(value, "end")?;
    let title = value
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    Some(RawCandidate { start, end, title })
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    let field = value.get(key)?;
    let number = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
