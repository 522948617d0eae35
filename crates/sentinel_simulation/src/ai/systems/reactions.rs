//! AI reactions на внешние события (health collaborator).

use bevy::prelude::*;

use crate::ai::components::{AgentArchetype, AgentState, Perception};
use crate::ai::events::AgentHook;
use crate::ai::machine::AgentContext;
use crate::clock::SimClock;
use crate::combat::Arsenal;
use crate::components::{Health, MovementCommand};
use crate::scheduler::ScheduledActions;

/// Система: health reached zero → Dead
///
/// Единственный вход в Dead извне state machine. Отменяет pending actions
/// (burst обрывается), останавливает движение, ставит despawn через death_cleanup.
pub fn enter_dead_on_zero_health(
    clock: Res<SimClock>,
    mut agents: Query<(
        Entity,
        &AgentArchetype,
        &Health,
        &mut AgentState,
        &mut Arsenal,
        &mut ScheduledActions,
        &Perception,
        &mut MovementCommand,
    )>,
    mut hook_events: EventWriter<AgentHook>,
) {
    let now = clock.elapsed_secs();
    let mut hooks = Vec::new();

    for (entity, archetype, health, mut state, mut arsenal, mut actions, perception, mut command) in
        agents.iter_mut()
    {
        if health.is_alive() || state.is_dead() {
            continue;
        }

        AgentContext {
            entity,
            archetype: &archetype.0,
            state: &mut state,
            arsenal: &mut arsenal,
            actions: &mut actions,
            perception,
            now,
            hooks: &mut hooks,
        }
        .enter_dead();

        command.set_if_neq(MovementCommand::Stop);
    }

    for hook in hooks {
        hook_events.write(hook);
    }
}
