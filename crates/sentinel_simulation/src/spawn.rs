//! Spawn агентов: bundle из архетипа + обработка SpawnAgentRequest.

use bevy::prelude::*;
use std::sync::Arc;

use crate::ai::components::{AgentArchetype, TargetRef};
use crate::combat::{Archetype, ArchetypeCatalog, Arsenal, SpawnAgentRequest};
use crate::components::{Health, MovementSpeed, Occluder};

/// Радиус тела агента (occlusion hurtbox)
const BODY_RADIUS: f32 = 0.5;

/// Полный набор компонентов агента
///
/// State = Idle, пулы полные, cooldowns готовы (остальное: Required Components
/// `AgentArchetype`).
pub fn agent_bundle(archetype: Arc<Archetype>, transform: Transform, target: Option<Entity>) -> impl Bundle {
    (
        transform,
        TargetRef(target),
        Arsenal::for_archetype(&archetype),
        Health::new(archetype.max_health),
        MovementSpeed {
            speed: archetype.move_speed,
        },
        Occluder::body(BODY_RADIUS, archetype.perception.eye_height),
        AgentArchetype(archetype),
    )
}

/// Система: SpawnAgentRequest → новые агенты
///
/// Summoned миньоны смотрят туда же, куда призыватель.
pub fn spawn_requested_agents(
    mut commands: Commands,
    catalog: Res<ArchetypeCatalog>,
    mut requests: EventReader<SpawnAgentRequest>,
    summoners: Query<&Transform>,
) {
    for request in requests.read() {
        let Some(archetype) = catalog.get(&request.archetype) else {
            crate::logger::log_warning(&format!(
                "⚠️ SpawnAgentRequest: unknown archetype '{}' (skipped)",
                request.archetype
            ));
            continue;
        };

        let rotation = request
            .summoner
            .and_then(|summoner| summoners.get(summoner).ok())
            .map(|transform| transform.rotation)
            .unwrap_or_default();
        let transform = Transform::from_translation(request.position).with_rotation(rotation);

        let entity = commands
            .spawn(agent_bundle(archetype, transform, request.target))
            .id();

        crate::logger::log(&format!(
            "✨ Spawned {} {:?} at {:?}",
            request.archetype, entity, request.position
        ));
    }
}
