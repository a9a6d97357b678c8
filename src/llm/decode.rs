//! Two-stage decoding of delegated model output: strict JSON first, then
//! recovery extractors that synthesize a structured shape from free text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;

lazy_static! {
    static ref BULLET_LINE: Regex = Regex::new(r"(?m)^\s*[-•]\s*(.+?)\s*$").unwrap();
    static ref FENCED_BLOCK: Regex = Regex::new(r"```[a-zA-Z]*\n([\s\S]*?)```").unwrap();
    static ref SECTION_HEADING: Regex = Regex::new(r"(?m)^##\s+").unwrap();
}

/// Strict decode of a model reply into the agent's payload shape.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Option<T> {
    serde_json::from_str(content.trim()).ok()
}

/// Recovery extractor: bullet-style lines marked with `-` or `•`.
pub fn extract_bullets(content: &str) -> Vec<String> {
    BULLET_LINE
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Recovery extractor: fenced code blocks, language tag stripped.
pub fn extract_fenced_blocks(content: &str) -> Vec<String> {
    FENCED_BLOCK
        .captures_iter(content)
        .map(|cap| cap[1].trim_end().to_string())
        .collect()
}

/// Number of level-2 Markdown headings in a document.
pub fn count_sections(markdown: &str) -> usize {
    SECTION_HEADING.find_iter(markdown).count()
}
