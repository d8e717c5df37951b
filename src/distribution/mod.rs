//! Content distribution
//!
//! The Distributor port with a deterministic mock implementation and a live
//! HubSpot implementation.

mod hubspot;
mod mock;
mod traits;

pub use hubspot::{validate_key, HubSpotDistributor};
pub use mock::MockDistributor;
pub use traits::*;
