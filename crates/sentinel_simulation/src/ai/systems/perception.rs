//! Perception system: perception query для каждого живого агента.

use bevy::prelude::*;

use crate::ai::components::{AgentArchetype, AgentState, Perception, TargetRef};
use crate::ai::perception::{distance, is_visible, LineOfSightSource, Pose, Volume};
use crate::components::{Health, Occluder};

/// Snapshot всех occluders за тик (perception и beam атаки)
pub fn collect_volumes(occluders: &Query<(Entity, &Occluder, &Transform)>) -> Vec<Volume> {
    occluders
        .iter()
        .map(|(entity, occluder, transform)| Volume::from_occluder(entity, occluder, transform))
        .collect()
}

/// Система: обновление Perception
///
/// Цель отсутствует / despawned / мертва → `Perception::lost()`.
/// Нет `LineOfSightSource` → цель никогда не видна (warning один раз).
pub fn update_perception(
    line_of_sight: Option<Res<LineOfSightSource>>,
    occluders: Query<(Entity, &Occluder, &Transform)>,
    targets: Query<(&Transform, Option<&Health>)>,
    mut agents: Query<(
        Entity,
        &AgentArchetype,
        &AgentState,
        &TargetRef,
        &Transform,
        &mut Perception,
    )>,
) {
    if line_of_sight.is_none() {
        crate::logger::log_warning_once(
            "perception:no-line-of-sight",
            "⚠️ No LineOfSightSource resource: agents will never see their targets",
        );
    }

    let volumes = collect_volumes(&occluders);

    for (entity, archetype, state, target_ref, transform, mut perception) in agents.iter_mut() {
        // Dead: perception больше не тикает
        if state.is_dead() {
            continue;
        }

        let Some(target) = target_ref.0 else {
            crate::logger::log_warning_once(
                "perception:no-target",
                &format!("⚠️ Agent {:?} ({}) has no target", entity, archetype.name),
            );
            perception.set_if_neq(Perception::lost());
            continue;
        };

        let alive_target = targets
            .get(target)
            .ok()
            .filter(|(_, health)| health.map_or(true, Health::is_alive));
        let Some((target_transform, _)) = alive_target else {
            // Stale target → потерян
            perception.set_if_neq(Perception::lost());
            continue;
        };

        let agent_pose = Pose::from(transform);
        let target_pose = Pose::from(target_transform);

        let resolved = line_of_sight
            .as_deref()
            .map(|source| source.resolve(&volumes, entity));
        let probe = resolved.as_ref().map(|los| los.probe());

        let visible = is_visible(&agent_pose, &target_pose, &archetype.perception, probe, target);

        perception.set_if_neq(Perception {
            target: Some(target),
            visible,
            distance: distance(&agent_pose, &target_pose),
            target_position: Some(target_pose.position),
        });
    }
}
