pub mod client;
pub mod tokens;
pub mod worker;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use tokens::{TokenStore, Tokens};
pub use worker::{ApiCommand, ApiHandle, ApiMessage};
