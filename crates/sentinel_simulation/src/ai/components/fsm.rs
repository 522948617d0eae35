//! Agent FSM components (state, archetype handle, target reference).

use bevy::prelude::*;
use std::sync::Arc;

use crate::ai::components::Perception;
use crate::combat::Archetype;

/// Состояние агента. Ровно одно активно в каждый тик.
///
/// Мутируется только state machine (`ai::machine`); `Dead` дополнительно
/// форсится health collaborator'ом.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
#[reflect(Component)]
pub enum AgentState {
    /// Spawn, или target потерян
    #[default]
    Idle,
    /// Target виден, но ни одна атака не выбирается
    Chase,
    /// Атака выбрана, burst идёт
    Engage,
    /// Пул пуст, идёт перезарядка
    Reloading,
    /// Telegraph перед charged атакой
    Charging,
    /// Telegraph перед summon
    Summoning,
    /// Окно после committed атаки
    Recovering,
    /// Terminal
    Dead,
}

impl AgentState {
    /// Состояния, в которых агент доворачивается к цели
    pub fn tracks_target(&self) -> bool {
        matches!(self, Self::Chase | Self::Engage | Self::Reloading)
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Charging | Self::Summoning | Self::Recovering)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Shared archetype агента (иммутабелен, один `Arc` на тип врага)
///
/// Маркер агента: через Required Components добавляет state machine компоненты.
/// Arsenal и Health зависят от архетипа: их кладёт `spawn::agent_bundle`.
#[derive(Component, Debug, Clone)]
#[require(
    AgentState,
    TargetRef,
    Perception,
    crate::scheduler::ScheduledActions,
    crate::components::MovementCommand,
    crate::components::MovementFeedback,
    Transform
)]
pub struct AgentArchetype(pub Arc<Archetype>);

impl std::ops::Deref for AgentArchetype {
    type Target = Archetype;

    fn deref(&self) -> &Archetype {
        &self.0
    }
}

/// Weak reference на цель (обычно игрок). Может быть пустой.
///
/// Entity мог быть despawned: perception проверяет каждый тик.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct TargetRef(pub Option<Entity>);
