//! Renders a catalog record into the single paragraph that gets embedded.
//!
//! Field order and phrasing are part of the contract: the paragraph is the
//! exact surface the embedding model sees, so changing either re-shapes the
//! embedding space and invalidates previously indexed data.

use crate::types::CatalogRecord;

/// Total pure function of its input: same record, byte-identical paragraph.
pub fn summarize(record: &CatalogRecord) -> String {
    let reviews = record
        .reviews
        .iter()
        .map(|r| format!("Rated {} on {}: {}", r.rating, r.date, r.comment))
        .collect::<Vec<_>>()
        .join(" ");

    let parts = [
        format!(
            "{}. {} Brand: {}.",
            record.name, record.description, record.brand
        ),
        format!("Made in {}.", record.manufacturer_address.country),
        format!("Categories: {}.", record.categories.join(", ")),
        reviews,
        format!(
            "Full price {}, sale price {}.",
            record.prices.full_price, record.prices.sale_price
        ),
        record.notes.clone(),
    ];
    parts.join(" ")
}
