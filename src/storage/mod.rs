//! Storage implementations for different backends

pub mod data;
#[cfg(feature = "file")]
pub mod file;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod seed;
#[cfg(feature = "typesense")]
pub mod typesense;

pub use data::MarketData;
#[cfg(feature = "file")]
pub use file::FileRepository;
pub use in_memory::InMemoryRepository;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRepository;
#[cfg(feature = "typesense")]
pub use typesense::TypesenseIndex;
