//! Damage: health collaborator.
//!
//! DamageRequest (от fire steps) и ProjectileHit (от хоста) → Health.
//! Убийственный удар генерирует EntityDied; перевод агента в Dead делает
//! `ai::systems::reactions`, читая Health == 0.

use bevy::prelude::*;

use crate::combat::events::ProjectileHit;
use crate::components::Health;

/// Event: запрос урона (beam/area hit, projectile hit)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct DamageRequest {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: u32,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Health.
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (health == 0)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// System: ProjectileHit (хост) → DamageRequest
pub fn process_projectile_hits(
    mut hit_events: EventReader<ProjectileHit>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    for hit in hit_events.read() {
        // Self-hit (пуля вылетела внутри собственного collider'а)
        if hit.shooter == hit.target {
            crate::logger::log(&format!(
                "⚠️ Self-hit ignored: {:?} hit itself",
                hit.shooter
            ));
            continue;
        }

        damage_requests.write(DamageRequest {
            attacker: hit.shooter,
            target: hit.target,
            amount: hit.damage,
        });
    }
}

/// System: применение DamageRequest к Health
///
/// Мёртвые и despawned цели игнорируются (stale target → no-op).
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<&mut Health>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let before = health.current;
        let dealt = health.take_damage(request.amount);
        let died = !health.is_alive();

        damage_dealt.write(DamageDealt {
            attacker: request.attacker,
            target: request.target,
            damage: dealt,
            target_died: died,
        });

        crate::logger::log(&format!(
            "💥 {:?} → {:?}: {} damage (HP: {} → {})",
            request.attacker, request.target, dealt, before, health.current
        ));

        if died {
            entity_died.write(EntityDied {
                entity: request.target,
                killer: Some(request.attacker),
            });
            crate::logger::log_info(&format!(
                "☠️ {:?} killed by {:?}",
                request.target, request.attacker
            ));
        }
    }
}
