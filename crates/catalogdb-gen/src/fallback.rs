//! Built-in records used whenever the generative model cannot produce a
//! usable batch. Every field is populated, so downstream stages never see a
//! partial record. Seeding always loads *something* valid.

use catalogdb_core::types::{CatalogRecord, ManufacturerAddress, Prices, Review};

pub fn fallback_records() -> Vec<CatalogRecord> {
    vec![
        CatalogRecord {
            id: "fallback-001".to_string(),
            name: "Hearthstone Cast Iron Skillet".to_string(),
            description: "A 12-inch pre-seasoned cast iron skillet with a pour spout on each \
                          side and a helper handle for oven work."
                .to_string(),
            brand: "Hearthstone Forge".to_string(),
            manufacturer_address: ManufacturerAddress {
                street: "410 Foundry Lane".to_string(),
                city: "South Pittsburg".to_string(),
                state: "TN".to_string(),
                postal_code: "37380".to_string(),
                country: "USA".to_string(),
            },
            prices: Prices {
                full_price: 64.0,
                sale_price: 48.0,
            },
            categories: vec![
                "kitchen".to_string(),
                "cookware".to_string(),
                "cast iron".to_string(),
            ],
            reviews: vec![
                Review {
                    date: "2025-01-18".to_string(),
                    rating: 5.0,
                    comment: "Sears a steak better than any pan I own.".to_string(),
                },
                Review {
                    date: "2025-02-27".to_string(),
                    rating: 4.0,
                    comment: "Heavy, but that is the point.".to_string(),
                },
            ],
            notes: "Hand wash only; re-season after acidic sauces.".to_string(),
        },
        CatalogRecord {
            id: "fallback-002".to_string(),
            name: "Meridian Wool Camp Blanket".to_string(),
            description: "A tightly woven 80/20 wool blend blanket sized for bunks and \
                          truck beds, with reinforced whip-stitched edges."
                .to_string(),
            brand: "Meridian Mills".to_string(),
            manufacturer_address: ManufacturerAddress {
                street: "7 Carding Mill Road".to_string(),
                city: "Bradford".to_string(),
                state: "West Yorkshire".to_string(),
                postal_code: "BD1 4QE".to_string(),
                country: "United Kingdom".to_string(),
            },
            prices: Prices {
                full_price: 89.5,
                sale_price: 89.5,
            },
            categories: vec![
                "outdoor".to_string(),
                "bedding".to_string(),
                "wool".to_string(),
            ],
            reviews: vec![Review {
                date: "2024-11-30".to_string(),
                rating: 5.0,
                comment: "Kept its loft through a wet November weekend.".to_string(),
            }],
            notes: "Dry clean or airing only; moth-proof storage bag included.".to_string(),
        },
    ]
}
