//! Headless movement: stand-in для navmesh агента хоста.
//!
//! Исполняет MovementCommand по прямой в плоскости XZ со скоростью `MovementSpeed`,
//! репортит MovementFeedback. Путь всегда валиден (нет препятствий).
//! Хост с настоящей навигацией этот plugin не подключает.

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::components::{MovementCommand, MovementFeedback, MovementSpeed};
use crate::SimulationSet;

pub struct HeadlessMovementPlugin;

impl Plugin for HeadlessMovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            execute_movement_commands.in_set(SimulationSet::Movement),
        );
    }
}

/// Система: один шаг движения к MoveToPosition target (без overshoot)
pub fn execute_movement_commands(
    clock: Res<SimClock>,
    mut movers: Query<(
        &MovementCommand,
        &MovementSpeed,
        &mut Transform,
        &mut MovementFeedback,
    )>,
) {
    let delta = clock.delta_secs();

    for (command, speed, mut transform, mut feedback) in movers.iter_mut() {
        let travelled = match command {
            MovementCommand::MoveToPosition { target } => {
                let mut offset = *target - transform.translation;
                offset.y = 0.0;
                let remaining = offset.length();
                let step = (speed.speed * delta).min(remaining);
                if step > f32::EPSILON {
                    transform.translation += offset / remaining * step;
                    step
                } else {
                    0.0
                }
            }
            MovementCommand::Idle | MovementCommand::Stop => 0.0,
        };

        feedback.set_if_neq(MovementFeedback {
            speed: travelled / delta,
            path_valid: true,
        });
    }
}
