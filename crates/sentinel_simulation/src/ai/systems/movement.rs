//! AI movement systems: поворот к цели и MovementCommand из состояния.

use bevy::prelude::*;

use crate::ai::components::{AgentArchetype, AgentState, Perception};
use crate::clock::SimClock;
use crate::combat::Archetype;
use crate::components::{MovementCommand, MovementFeedback};

/// Yaw-only поворот к точке, не больше `max_step` радиан
///
/// Returns фактический угол поворота.
pub fn turn_toward(transform: &mut Transform, target: Vec3, max_step: f32) -> f32 {
    let forward = transform.forward().as_vec3();
    let flat_forward = Vec3::new(forward.x, 0.0, forward.z);
    let to_target = target - transform.translation;
    let desired = Vec3::new(to_target.x, 0.0, to_target.z);

    if flat_forward.length_squared() < f32::EPSILON || desired.length_squared() < f32::EPSILON {
        return 0.0;
    }

    // Знак по cross.y: положительный = цель против часовой (вид сверху)
    let yaw = flat_forward.cross(desired).y.atan2(flat_forward.dot(desired));
    let step = yaw.signum() * yaw.abs().min(max_step.max(0.0));
    if step.abs() > f32::EPSILON {
        transform.rotate_y(step);
    }
    step
}

/// Какой MovementCommand соответствует состоянию
pub fn movement_for(
    archetype: &Archetype,
    state: AgentState,
    perception: &Perception,
    feedback: &MovementFeedback,
) -> MovementCommand {
    match state {
        AgentState::Idle => MovementCommand::Idle,
        AgentState::Chase if archetype.move_speed > 0.0 => match perception.target_position {
            Some(target)
                if feedback.path_valid && perception.distance > archetype.stopping_distance =>
            {
                MovementCommand::MoveToPosition { target }
            }
            _ => MovementCommand::Stop,
        },
        // Engage/Charging/Reloading/... и стационарные архетипы стоят
        _ => MovementCommand::Stop,
    }
}

/// Система: ориентация + движение агентов
///
/// Поворот только в tracking состояниях (Chase/Engage/Reloading):
/// Idle ещё не захватил цель, Charging/Summoning/Recovering подавляют rotation-follow.
pub fn steer_agents(
    clock: Res<SimClock>,
    mut agents: Query<(
        &AgentArchetype,
        &AgentState,
        &Perception,
        &MovementFeedback,
        &mut Transform,
        &mut MovementCommand,
    )>,
) {
    let delta = clock.delta_secs();

    for (archetype, state, perception, feedback, mut transform, mut command) in agents.iter_mut() {
        if state.tracks_target() {
            if let Some(target) = perception.target_position {
                let max_step = archetype.turn_rate * delta;
                // Проверяем на копии: иначе Changed<Transform> спамит каждый тик
                let mut turned = *transform;
                if turn_toward(&mut turned, target, max_step) != 0.0 {
                    *transform = turned;
                }
            }
        }

        let next = movement_for(archetype, *state, perception, feedback);
        if *command != next {
            crate::logger::log(&format!("🏃 {} movement: {:?} → {:?}", archetype.name, *command, next));
            *command = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_turn_is_rate_limited() {
        // Forward = -Z, цель справа (+X): нужно -90° по Y
        let mut transform = Transform::default();
        let step = turn_toward(&mut transform, Vec3::new(10.0, 0.0, 0.0), 0.5);
        assert!((step + 0.5).abs() < 1e-5);

        for _ in 0..10 {
            turn_toward(&mut transform, Vec3::new(10.0, 0.0, 0.0), 0.5);
        }
        assert!((transform.forward().as_vec3() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_infinite_turn_rate_snaps() {
        let mut transform = Transform::default();
        let step = turn_toward(&mut transform, Vec3::new(-5.0, 3.0, 0.0), f32::INFINITY);
        assert!((step - FRAC_PI_2).abs() < 1e-5);
        assert!((transform.forward().as_vec3() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_target_straight_above_does_not_turn() {
        let mut transform = Transform::default();
        assert_eq!(turn_toward(&mut transform, Vec3::Y * 5.0, 1.0), 0.0);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_movement_commands_by_state() {
        let chaser = Archetype::chaser();
        let feedback = MovementFeedback::default();
        let perception = Perception {
            target: Some(Entity::from_raw(1)),
            visible: true,
            distance: 10.0,
            target_position: Some(Vec3::new(0.0, 0.0, -10.0)),
        };

        assert_eq!(
            movement_for(&chaser, AgentState::Chase, &perception, &feedback),
            MovementCommand::MoveToPosition {
                target: Vec3::new(0.0, 0.0, -10.0)
            }
        );
        assert_eq!(
            movement_for(&chaser, AgentState::Idle, &perception, &feedback),
            MovementCommand::Idle
        );
        for state in [
            AgentState::Engage,
            AgentState::Reloading,
            AgentState::Charging,
            AgentState::Recovering,
            AgentState::Dead,
        ] {
            assert_eq!(
                movement_for(&chaser, state, &perception, &feedback),
                MovementCommand::Stop
            );
        }
    }

    #[test]
    fn test_chase_stops_inside_stopping_distance_or_without_path() {
        let trooper = Archetype::light_trooper();
        let mut perception = Perception {
            target: Some(Entity::from_raw(1)),
            visible: true,
            distance: 6.0,
            target_position: Some(Vec3::new(0.0, 0.0, -6.0)),
        };
        let feedback = MovementFeedback::default();
        assert_eq!(
            movement_for(&trooper, AgentState::Chase, &perception, &feedback),
            MovementCommand::Stop
        );

        perception.distance = 14.0;
        let blocked = MovementFeedback {
            speed: 0.0,
            path_valid: false,
        };
        assert_eq!(
            movement_for(&trooper, AgentState::Chase, &perception, &blocked),
            MovementCommand::Stop
        );
    }

    #[test]
    fn test_static_archetype_never_moves() {
        let turret = Archetype::turret();
        let perception = Perception {
            target: Some(Entity::from_raw(1)),
            visible: true,
            distance: 20.0,
            target_position: Some(Vec3::new(0.0, 0.0, -20.0)),
        };
        assert_eq!(
            movement_for(&turret, AgentState::Chase, &perception, &MovementFeedback::default()),
            MovementCommand::Stop
        );
    }
}
