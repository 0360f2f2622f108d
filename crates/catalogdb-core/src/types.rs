//! Domain types shared by the generator, the loader, and the store.

use serde::{Deserialize, Serialize};

/// Where an item is manufactured. All fields are plain strings straight from
/// the generative model (or the built-in dataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// `sale_price <= full_price` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prices {
    pub full_price: f64,
    pub sale_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub date: String,
    /// 1..=5.
    pub rating: f32,
    pub comment: String,
}

/// One synthetic catalog item.
///
/// The wire format (model output, persisted metadata) uses camelCase keys.
/// Records entering the pipeline are trusted to be fully populated: either
/// they parsed against this schema or they came from the built-in dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Unique within a seeding run.
    pub id: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub manufacturer_address: ManufacturerAddress,
    pub prices: Prices,
    /// Ordered list of tags.
    pub categories: Vec<String>,
    pub reviews: Vec<Review>,
    pub notes: String,
}

/// One row bound for the vector table: the paragraph that was embedded, its
/// vector, and the source record carried verbatim. Written once per reseed,
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct IndexableRecord {
    pub summary_text: String,
    pub embedding_vector: Vec<f32>,
    pub metadata: CatalogRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    Cosine,
    L2,
}

/// Declared target state for the collection's vector index. Provisioning
/// reconciles the store's observed indices against this.
#[derive(Debug, Clone)]
pub struct VectorIndexDescriptor {
    pub name: String,
    /// Column holding the embedding vectors.
    pub column: String,
    pub dim: i32,
    pub metric: SimilarityMetric,
}

impl VectorIndexDescriptor {
    pub fn cosine(name: &str, column: &str, dim: i32) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            dim,
            metric: SimilarityMetric::Cosine,
        }
    }
}
