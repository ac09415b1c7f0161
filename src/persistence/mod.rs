//! Persisted order documents: save/load/delete and first-run seeding

pub mod adapter;
pub mod seed;

pub use adapter::OrderPersistenceAdapter;
pub use seed::{DemoSeeder, SeedReport};
