//! Core types for Dirgate

mod directory;
mod identity;
mod outcome;

pub use directory::*;
pub use identity::*;
pub use outcome::*;
