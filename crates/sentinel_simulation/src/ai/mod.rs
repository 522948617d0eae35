//! AI decision-making module
//!
//! Один Combat Agent State Machine вместо отдельного контроллера на каждый тип врага:
//! поведение задаётся `Archetype` (perception, атаки, пулы).

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod machine;
pub mod perception;
pub mod selector;
pub mod systems;

// Re-export основных типов
pub use components::{AgentArchetype, AgentState, Perception, TargetRef};
pub use events::AgentHook;
pub use machine::{AgentContext, Directive};
pub use perception::{FnProbe, HitTag, LineOfSightSource, OcclusionProbe, Pose};
pub use selector::select_attack;

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок внутри тика (по SimulationSet):
/// 1. Health: enter_dead_on_zero_health: после применения урона
/// 2. Perception: update_perception
/// 3. Decision: tick_arsenals → run_state_machines → steer_agents
/// 4. Actions: drain_scheduled_actions
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AgentHook>();

        app.add_systems(
            FixedUpdate,
            (
                systems::enter_dead_on_zero_health
                    .in_set(SimulationSet::Health)
                    .after(crate::combat::apply_damage_requests),
                systems::update_perception.in_set(SimulationSet::Perception),
                (
                    systems::tick_arsenals,
                    systems::run_state_machines,
                    systems::steer_agents,
                )
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(SimulationSet::Decision),
                systems::drain_scheduled_actions.in_set(SimulationSet::Actions),
            ),
        );
    }
}
