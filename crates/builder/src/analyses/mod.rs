//! Reference analyses

mod hub_sizing;
mod reference_marking;

pub use hub_sizing::{HubSizing, HUB_SIZE};
pub use reference_marking::{ReferenceMarking, IS_REFERENCED};
