//! Type definitions for the NovaMind pipeline
//!
//! Content pieces, engagement outcomes, performance summaries and the campaign
//! record that owns them.

mod campaign;
mod content;
mod outcome;
mod performance;

pub use campaign::*;
pub use content::*;
pub use outcome::*;
pub use performance::*;
