#![forbid(unsafe_code)]

mod backend;
mod cache;
mod connection;
mod entry;
mod file;
mod id;
mod memory;
mod rest;
mod service;
mod store;

pub use backend::{BackendConfig, BackendKind, open_store};
pub use cache::{CacheConfig, CacheStore};
pub use entry::{Decision, ExpiryReason, Paste, PasteView, evaluate};
pub use file::FileStore;
pub use id::{generate_id, is_valid_id, paste_key};
pub use memory::MemoryStore;
pub use rest::{RestConfig, RestKvStore};
pub use service::{NewPaste, PasteService};
pub use store::PasteStore;
