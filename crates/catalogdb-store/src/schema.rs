//! Arrow schema for the catalog items table.

use anyhow::Result;
use arrow_array::{FixedSizeListArray, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

use catalogdb_core::types::IndexableRecord;

pub const EMBEDDING_DIM: i32 = 768;
pub const VECTOR_COLUMN: &str = "vector";

pub fn build_items_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("brand", DataType::Utf8, false),
        Field::new("summary", DataType::Utf8, false),
        // The source record, serialized verbatim as JSON.
        Field::new("metadata", DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM,
            ),
            true,
        ),
    ]))
}

pub fn items_to_record_batch(items: &[IndexableRecord]) -> Result<RecordBatch> {
    let schema = build_items_schema();
    let mut ids = Vec::new();
    let mut names = Vec::new();
    let mut brands = Vec::new();
    let mut summaries = Vec::new();
    let mut metadata = Vec::new();
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for item in items {
        ids.push(item.metadata.id.clone());
        names.push(item.metadata.name.clone());
        brands.push(item.metadata.brand.clone());
        summaries.push(item.summary_text.clone());
        metadata.push(serde_json::to_string(&item.metadata)?);
        vectors.push(Some(
            item.embedding_vector.iter().map(|&x| Some(x)).collect(),
        ));
    }
    let record_batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(brands)),
            Arc::new(StringArray::from(summaries)),
            Arc::new(StringArray::from(metadata)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), EMBEDDING_DIM)),
        ],
    )?;
    Ok(record_batch)
}
