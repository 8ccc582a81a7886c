//! Store implementations for short URLs and pastes.

pub mod memory;
pub mod mysql;

pub use memory::{InMemoryPasteStore, InMemoryShortUrlStore};
pub use mayfly_core::error::StorageError;
pub use mayfly_core::store::{PasteStore, ShortUrlStore};
pub use mysql::{MySqlPasteStore, MySqlShortUrlStore, MySqlStores};
