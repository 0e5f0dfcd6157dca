pub mod settings_io;
pub mod store;

pub use store::{FileStore, MemoryStore, Store, StoreError, data_dir};
