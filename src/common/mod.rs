//! Common types, traits, and error definitions
//!
//! Value types, the planner lifecycle trait and the crate error enum used
//! by every other module.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
