//! Infrastructure layer: entity lookup backends.

pub mod directory;
pub mod postgres;

pub use directory::InMemoryDirectory;
pub use postgres::PostgresLookup;
