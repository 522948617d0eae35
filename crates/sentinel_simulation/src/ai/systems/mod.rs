//! AI systems (perception, state machine, steering, queue drain)

pub mod actions;
pub mod fsm;
pub mod movement;
pub mod perception;
pub mod reactions;

// Re-export all systems
pub use actions::*;
pub use fsm::*;
pub use movement::*;
pub use perception::*;
pub use reactions::*;
