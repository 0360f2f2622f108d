//! Turns one model call into a batch of catalog records.
//!
//! The model is asked for a bare JSON array. Responses routinely arrive
//! wrapped in prose, so the first bracket-delimited span is cut out and
//! parsed against the record schema. Any failure along that path falls back
//! to the built-in dataset: a seeding run always gets valid records.

use async_trait::async_trait;
use tracing::{info, warn};

use catalogdb_core::traits::{RecordSource, TextModel};
use catalogdb_core::types::CatalogRecord;

use crate::fallback::fallback_records;

pub const DEFAULT_TARGET_RECORDS: usize = 10;

/// Outcome of the schema-validating parse. The fallback decision branches on
/// this value rather than on error propagation.
#[derive(Debug)]
pub enum ParsedBatch {
    Valid(Vec<CatalogRecord>),
    Invalid(String),
}

/// First `[` through last `]`, or None when the response holds no array.
fn extract_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn parse_records(raw: &str) -> ParsedBatch {
    let Some(span) = extract_array(raw) else {
        return ParsedBatch::Invalid("no bracket-delimited array in response".to_string());
    };
    match serde_json::from_str::<Vec<CatalogRecord>>(span) {
        Ok(records) => ParsedBatch::Valid(records),
        Err(e) => ParsedBatch::Invalid(format!("array did not match record schema: {}", e)),
    }
}

pub struct RecordGenerator {
    model: Box<dyn TextModel>,
    target: usize,
}

impl RecordGenerator {
    pub fn new(model: Box<dyn TextModel>, target: usize) -> Self {
        Self { model, target }
    }

    fn prompt(&self) -> String {
        // The worked example doubles as the schema the model must follow.
        let example = serde_json::to_string_pretty(&fallback_records()[0])
            .unwrap_or_else(|_| "{}".to_string());
        format!(
            "Generate {count} fictional retail catalog items as a JSON array.\n\
             Each element must have exactly these fields: id (string, unique), name, \
             description, brand, manufacturerAddress (street, city, state, postalCode, \
             country), prices (fullPrice, salePrice as numbers), categories (array of \
             strings), reviews (array of objects with date, rating from 1 to 5, comment), \
             and notes.\n\
             Here is one example element:\n{example}\n\
             Respond with ONLY the JSON array. No explanations, no markdown fences, \
             no text before or after the array.",
            count = self.target,
            example = example,
        )
    }
}

#[async_trait]
impl RecordSource for RecordGenerator {
    /// Never fails: a model error or unusable response degrades to the
    /// built-in dataset.
    async fn generate(&self) -> anyhow::Result<Vec<CatalogRecord>> {
        let raw = match self.model.invoke(&self.prompt()).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "generation call failed, using built-in records");
                return Ok(fallback_records());
            }
        };
        match parse_records(&raw) {
            ParsedBatch::Valid(records) => {
                info!(count = records.len(), "parsed generated records");
                Ok(records)
            }
            ParsedBatch::Invalid(reason) => {
                warn!(%reason, raw_response = %raw, "unusable model output, using built-in records");
                Ok(fallback_records())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_array_finds_span_inside_prose() {
        let raw = "Sure! Here are your items:\n[{\"a\": 1}]\nLet me know if...";
        assert_eq!(extract_array(raw), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn extract_array_spans_first_open_to_last_close() {
        let raw = "x [1, [2, 3]] y ] nope";
        assert_eq!(extract_array(raw), Some("[1, [2, 3]] y ]"));
    }

    #[test]
    fn extract_array_rejects_missing_or_reversed_brackets() {
        assert!(extract_array("no json here").is_none());
        assert!(extract_array("only open [").is_none());
        assert!(extract_array("] backwards [").is_none());
    }

    #[test]
    fn parse_records_classifies_schema_mismatch() {
        match parse_records("[{\"id\": \"x\"}]") {
            ParsedBatch::Invalid(reason) => assert!(reason.contains("schema")),
            ParsedBatch::Valid(_) => panic!("partial record must not parse"),
        }
    }
}
