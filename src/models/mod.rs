//! Model descriptors.

pub mod capabilities;

pub use capabilities::ModelCapabilities;
