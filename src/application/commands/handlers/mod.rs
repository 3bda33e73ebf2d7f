//! Command Handlers

mod entity_handlers;

pub use entity_handlers::*;
