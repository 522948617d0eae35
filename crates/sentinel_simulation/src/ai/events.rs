//! AI Events: hooks для анимаций/звука (fire-and-forget)
//!
//! State machine складывает hooks в буфер, системы публикуют их как Bevy events.
//! Хост (animation tree, audio) читает через `EventReader<AgentHook>`.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum AgentHook {
    /// Атака выбрана (telegraph/анимация стартуют сейчас)
    AttackTriggered {
        agent: Entity,
        /// `AttackDefinition::id`
        attack: String,
    },

    /// Перезарядка началась
    ReloadStarted { agent: Entity, pool: usize },

    /// Агент умер (death анимация)
    Died { agent: Entity },
}

impl AgentHook {
    pub fn agent(&self) -> Entity {
        match self {
            AgentHook::AttackTriggered { agent, .. }
            | AgentHook::ReloadStarted { agent, .. }
            | AgentHook::Died { agent } => *agent,
        }
    }
}
