#![forbid(unsafe_code)]

mod clock;
pub mod config;
pub mod handler;
mod page;

pub use clock::RequestClock;
pub use config::{Args, ServerConfig};
pub use handler::{AppState, app};
