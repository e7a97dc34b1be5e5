//! HTTP request handlers.

pub mod health;
pub mod keys;
pub mod objects;

pub use health::*;
pub use keys::*;
pub use objects::*;
