use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::corpus::error::LoadError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    pub fn new(text: &str, tags: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Outcome of normalizing a raw question document.
#[derive(Debug, Default)]
pub struct ParsedQuestions {
    pub questions: Vec<Question>,
    pub skipped: usize,
    pub merged: usize,
}

/// Parse a JSON document that must be an array of `{ text, tags }` records.
///
/// Elements without a non-empty string `text` are skipped. A missing `tags`
/// field means no tags; non-string tag entries are dropped. Records sharing the
/// same text are merged into the first occurrence so text stays a unique key.
pub fn parse_questions(json: &str) -> Result<ParsedQuestions, LoadError> {
    let doc: Value = serde_json::from_str(json)?;
    let Value::Array(records) = doc else {
        return Err(LoadError::Shape(
            "question document is not a JSON array".to_string(),
        ));
    };

    let mut parsed = ParsedQuestions::default();
    let mut by_text: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for record in records {
        let Some(question) = question_from_value(&record) else {
            parsed.skipped += 1;
            continue;
        };

        if let Some(&idx) = by_text.get(&question.text) {
            let existing = &mut parsed.questions[idx];
            for tag in question.tags {
                if !existing.tags.contains(&tag) {
                    existing.tags.push(tag);
                }
            }
            parsed.merged += 1;
        } else {
            by_text.insert(question.text.clone(), parsed.questions.len());
            parsed.questions.push(question);
        }
    }
    Ok(parsed)
}

fn question_from_value(value: &Value) -> Option<Question> {
    let obj = value.as_object()?;
    let text = obj.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let mut tags: Vec<String> = Vec::new();
    if let Some(Value::Array(raw_tags)) = obj.get("tags") {
        for tag in raw_tags.iter().filter_map(Value::as_str) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
    }
    Some(Question {
        text: text.to_string(),
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_records() {
        let json = r#"[
            {"text": "First?", "tags": ["A", "B"]},
            {"text": "Second?", "tags": []}
        ]"#;
        let parsed = parse_questions(json).unwrap();
        assert_eq!(parsed.questions.len(), 2);
        assert_eq!(parsed.questions[0], Question::new("First?", &["A", "B"]));
        assert!(parsed.questions[1].tags.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_missing_tags_defaults_to_empty() {
        let parsed = parse_questions(r#"[{"text": "Untagged?"}]"#).unwrap();
        assert_eq!(parsed.questions.len(), 1);
        assert!(parsed.questions[0].tags.is_empty());
    }

    #[test]
    fn test_records_without_text_are_skipped() {
        let json = r#"[
            {"tags": ["A"]},
            {"text": "", "tags": ["A"]},
            {"text": 42},
            "not an object",
            {"text": "Kept?", "tags": ["A"]}
        ]"#;
        let parsed = parse_questions(json).unwrap();
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.skipped, 4);
    }

    #[test]
    fn test_non_array_is_shape_error() {
        let err = parse_questions(r#"{"text": "Lonely?"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Shape(_)));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_questions("[{").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_duplicate_text_merges_tags() {
        let json = r#"[
            {"text": "Same?", "tags": ["A"]},
            {"text": "Other?", "tags": ["C"]},
            {"text": "Same?", "tags": ["B", "A"]}
        ]"#;
        let parsed = parse_questions(json).unwrap();
        assert_eq!(parsed.questions.len(), 2);
        assert_eq!(parsed.questions[0].tags, vec!["A", "B"]);
        assert_eq!(parsed.merged, 1);
    }

    #[test]
    fn test_non_string_tags_are_dropped() {
        let parsed = parse_questions(r#"[{"text": "Q?", "tags": ["A", 3, null, "A"]}]"#).unwrap();
        assert_eq!(parsed.questions[0].tags, vec!["A"]);
    }

    #[test]
    fn test_large_document_with_repeats_keeps_first_positions() {
        let records: Vec<String> = (0..5_000)
            .map(|i| format!(r#"{{"text": "Q{}?", "tags": ["T{}"]}}"#, i % 1_000, i % 3))
            .collect();
        let parsed = parse_questions(&format!("[{}]", records.join(","))).unwrap();

        assert_eq!(parsed.questions.len(), 1_000);
        assert_eq!(parsed.merged, 4_000);
        assert_eq!(parsed.questions[0].text, "Q0?");
        assert_eq!(parsed.questions[999].text, "Q999?");
        // Q0 appears at i = 0, 1000, 2000, 3000, 4000 -> tags T0, T1, T2
        assert_eq!(parsed.questions[0].tags, vec!["T0", "T1", "T2"]);
    }
}
