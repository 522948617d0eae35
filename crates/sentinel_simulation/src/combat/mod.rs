//! Combat system module
//!
//! ECS ответственность:
//! - Attack data: AttackDefinition, Archetype, ArchetypeCatalog
//! - Per-agent state: Arsenal (cooldowns, ammo pools, busy lock)
//! - Health collaborator: DamageRequest → Health → DamageDealt / EntityDied
//! - Effect spawner boundary: BeamFired, ProjectileLaunched, AreaBlast, SpawnAgentRequest
//!
//! Хост ответственность:
//! - визуал лучей/взрывов, полёт пуль (ProjectileHit обратно в ECS)

use bevy::prelude::*;

pub mod ammo;
pub mod archetype;
pub mod arsenal;
pub mod attack;
pub mod cooldown;
pub mod damage;
pub mod events;

// Re-export основных типов
pub use ammo::AmmoPool;
pub use archetype::{Archetype, ArchetypeCatalog, ArchetypeError, PerceptionParams, PoolDefinition};
pub use arsenal::{Arsenal, BusyLock};
pub use attack::{AmmoConsumption, AttackDefinition, AttackEffect};
pub use cooldown::CooldownTimer;
pub use damage::{apply_damage_requests, process_projectile_hits, DamageDealt, DamageRequest, EntityDied};
pub use events::{
    AreaBlast, BeamFired, ProjectileHit, ProjectileLaunched, ShotOutcome, ShotResolved, SpawnAgentRequest,
};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat события и health фазу в FixedUpdate.
///
/// Порядок выполнения (SimulationSet::Health):
/// 1. process_projectile_hits: ProjectileHit (хост) → DamageRequest
/// 2. apply_damage_requests: DamageRequest → Health, DamageDealt, EntityDied
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<ProjectileHit>()
            .add_event::<ProjectileLaunched>()
            .add_event::<BeamFired>()
            .add_event::<AreaBlast>()
            .add_event::<ShotResolved>()
            .add_event::<SpawnAgentRequest>();

        app.add_systems(
            FixedUpdate,
            (process_projectile_hits, apply_damage_requests)
                .chain()
                .in_set(SimulationSet::Health),
        );
    }
}
