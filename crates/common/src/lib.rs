#![forbid(unsafe_code)]

mod error;

pub use error::*;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CACHE_PORT: u16 = 6379;
pub const DEFAULT_STORE_FILE: &str = ".local-kv-store.json";
pub const KEY_PREFIX: &str = "paste:";
pub const ID_LENGTH: usize = 10;
pub const MAX_ID_LENGTH: usize = 64;
/// Último instante de expiração aceito: 9999-12-31T23:59:59.999Z.
pub const MAX_EXPIRES_AT_MS: u64 = 253_402_300_799_999;
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";
pub const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024; // 4 KB
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024; // 64 MB
