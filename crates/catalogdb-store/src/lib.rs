pub mod loader;
pub mod provision;
pub mod schema;
pub mod seed;
pub mod table;

pub use loader::{load, LoadOptions, LoadReport};
pub use seed::{SeedOptions, SeedOutcome, Seeder};
