//! Perception component: результат perception query за текущий тик.

use bevy::prelude::*;

/// Что агент знает о цели в этом тике
///
/// Перезаписывается `update_perception` каждый тик (без hysteresis).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Perception {
    /// Живая цель (None = нет / despawned / мертва)
    pub target: Option<Entity>,
    /// Range + view cone + line of sight пройдены
    pub visible: bool,
    /// Дистанция до цели (`INFINITY` если цели нет)
    pub distance: f32,
    /// Позиция цели (pivot)
    pub target_position: Option<Vec3>,
}

impl Default for Perception {
    fn default() -> Self {
        Self::lost()
    }
}

impl Perception {
    pub fn lost() -> Self {
        Self {
            target: None,
            visible: false,
            distance: f32::INFINITY,
            target_position: None,
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }
}
