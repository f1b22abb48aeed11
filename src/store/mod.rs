pub mod json_store;
pub mod schema;
pub mod selection;

pub use json_store::{JsonSessionStore, MemoryStorage, SessionStorage, StorageWrite};
pub use selection::SelectionStore;
