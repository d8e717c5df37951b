//! Persona system: the audience segments campaigns are written for.
//!
//! The catalog is built once at start-up from configuration, falling back to
//! the bundled founders / creatives / operations set.

pub mod catalog;
pub mod registry;
pub mod types;

pub use catalog::PersonaCatalog;
pub use types::Persona;
