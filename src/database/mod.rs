pub mod executor;
pub mod manager;
pub mod memory;
pub mod postgres;
pub mod query_builder;
pub mod store;

pub use executor::{execute, Page};
pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use store::{Document, DocumentPatch, DocumentStore, StoreError, StoreHandle};
