//! FSM systems (cooldowns, per-tick state machine step).

use bevy::prelude::*;

use crate::ai::components::{AgentArchetype, AgentState, Perception};
use crate::ai::events::AgentHook;
use crate::ai::machine::AgentContext;
use crate::clock::SimClock;
use crate::combat::Arsenal;
use crate::scheduler::ScheduledActions;

/// Система: cooldown таймеры всех живых агентов
pub fn tick_arsenals(clock: Res<SimClock>, mut agents: Query<(&AgentState, &mut Arsenal)>) {
    let delta = clock.delta_secs();

    for (state, mut arsenal) in agents.iter_mut() {
        if state.is_dead() {
            continue;
        }
        arsenal.tick(delta);
    }
}

/// Система: transition rule текущего состояния + выбор атаки
///
/// Порядок в тике: perception → эта система → drain очереди.
/// Атака, выбранная здесь, ставит выстрел с offset 0: он сработает в drain этого же тика.
pub fn run_state_machines(
    clock: Res<SimClock>,
    mut agents: Query<(
        Entity,
        &AgentArchetype,
        &mut AgentState,
        &mut Arsenal,
        &mut ScheduledActions,
        &Perception,
    )>,
    mut hook_events: EventWriter<AgentHook>,
) {
    let now = clock.elapsed_secs();
    let mut hooks = Vec::new();

    for (entity, archetype, mut state, mut arsenal, mut actions, perception) in agents.iter_mut() {
        if state.is_dead() {
            continue;
        }

        // Копия state: Changed<AgentState> срабатывает только на реальном переходе
        let mut next_state = *state;
        AgentContext {
            entity,
            archetype: &archetype.0,
            state: &mut next_state,
            arsenal: &mut arsenal,
            actions: &mut actions,
            perception,
            now,
            hooks: &mut hooks,
        }
        .step();
        state.set_if_neq(next_state);
    }

    for hook in hooks {
        hook_events.write(hook);
    }
}
