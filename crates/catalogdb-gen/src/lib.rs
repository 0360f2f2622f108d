pub mod fallback;
pub mod generator;
pub mod ollama;

pub use fallback::fallback_records;
pub use generator::{parse_records, ParsedBatch, RecordGenerator};
pub use ollama::OllamaTextModel;
