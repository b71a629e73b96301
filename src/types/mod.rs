//! Core types for switchyard.

pub mod generation;
pub mod json;
pub mod message;
pub mod state;

pub use generation::*;
pub use json::{try_parse, try_parse_object};
pub use message::*;
pub use state::*;
