//! Symbol pool and background artwork loading.
//!
//! ## Key Types
//!
//! - `SymbolRef`: Index of a symbol inside its pool
//! - `Symbol`: Display name plus (lazily loaded) artwork
//! - `SymbolPool`: Ordered collection handed to the generator
//! - `ImageLoader`: Single-slot background decoder for symbol artwork

pub mod loader;
pub mod pool;

pub use loader::ImageLoader;
pub use pool::{Symbol, SymbolPool, SymbolRef};
