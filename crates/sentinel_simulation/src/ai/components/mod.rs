//! AI components

pub mod fsm;
pub mod perception;


// Re-export all components
pub use fsm::*;
pub use perception::*;
