//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: Health, Player marker
//! - movement: MovementCommand, MovementFeedback, MovementSpeed
//! - world: Occluder (line-of-sight volumes)
//!
//! AI компоненты (AgentState, Perception, ...) живут в `ai::components`,
//! боевые (Arsenal) в `combat`.

pub mod actor;
pub mod movement;
pub mod world;

pub use actor::*;
pub use movement::*;
pub use world::*;
