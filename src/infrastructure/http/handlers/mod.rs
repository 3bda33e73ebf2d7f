//! HTTP Handlers

mod admin;
mod ping;

pub use admin::*;
pub use ping::*;
