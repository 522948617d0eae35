//! Movement компоненты: команды перемещения и обратная связь навигации

use bevy::prelude::*;

/// Команда движения (выполняется movement collaborator'ом)
///
/// Архитектура:
/// - AI пишет MovementCommand (high-level intent)
/// - Хост (navmesh agent или `HeadlessMovementPlugin`) исполняет
/// - Хост репортит `MovementFeedback`
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub enum MovementCommand {
    /// Стоять на месте (не трогать навигацию)
    #[default]
    Idle,
    /// Двигаться к позиции (world coordinates)
    MoveToPosition { target: Vec3 },
    /// Остановиться немедленно (сбросить velocity)
    Stop,
}

/// Отчёт movement collaborator'а за последний тик
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MovementFeedback {
    /// Текущая скорость (м/с)
    pub speed: f32,
    /// Путь к цели существует (navmesh)
    pub path_valid: bool,
}

impl Default for MovementFeedback {
    fn default() -> Self {
        Self {
            speed: 0.0,
            path_valid: true,
        }
    }
}

/// Скорость движения (метры/сек), 0 = стационарный
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementSpeed {
    pub speed: f32,
}
