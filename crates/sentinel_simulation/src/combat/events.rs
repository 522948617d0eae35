//! Combat events: effect spawner boundary.
//!
//! Architecture:
//! - ECS: решает КОГДА и ЧЕМ стрелять (scheduled fire steps)
//! - Хост: визуал луча, полёт пули, спавн префабов
//! - Events: BeamFired / ProjectileLaunched / AreaBlast (ECS → хост),
//!   ProjectileHit (хост → ECS)

use bevy::prelude::*;

/// Результат одного fire step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotOutcome {
    /// Beam/area попал в цель (damage запрошен)
    Hit,
    /// Beam перекрыт / цель вне радиуса / цель stale
    Miss,
    /// Projectile выпущен (попадание репортит хост)
    Launched,
    /// Summon requests отправлены
    Summoned,
    /// Пул пуст: выстрел пропущен
    Skipped,
}

/// Event: fire step отработал
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ShotResolved {
    pub agent: Entity,
    /// `AttackDefinition::id`
    pub attack: String,
    /// Номер выстрела в burst'е
    pub shot: u32,
    pub outcome: ShotOutcome,
}

/// Event: hitscan луч (ECS → хост, для визуала)
#[derive(Event, Debug, Clone)]
pub struct BeamFired {
    pub shooter: Entity,
    pub origin: Vec3,
    /// Конец луча (точка цели при попадании)
    pub end: Vec3,
    /// В кого попал
    pub hit: Option<Entity>,
    pub damage: u32,
}

/// Event: projectile выпущен (ECS → хост)
///
/// Хост владеет полётом и collision; попадание возвращается как `ProjectileHit`.
#[derive(Event, Debug, Clone)]
pub struct ProjectileLaunched {
    pub shooter: Entity,
    /// В кого целились
    pub target: Option<Entity>,
    pub origin: Vec3,
    /// Нормализованное направление (с учётом spread)
    pub direction: Vec3,
    pub speed: f32,
    pub damage: u32,
}

/// Event: projectile попал в цель (хост → ECS)
#[derive(Event, Debug, Clone)]
pub struct ProjectileHit {
    /// Кто выстрелил (для предотвращения self-hit)
    pub shooter: Entity,
    /// В кого попали
    pub target: Entity,
    pub damage: u32,
}

/// Event: удар по области (shockwave, lunge)
#[derive(Event, Debug, Clone)]
pub struct AreaBlast {
    pub source: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub damage: u32,
    /// Цель внутри радиуса
    pub hit: Option<Entity>,
}

/// Event: заспавнить агента (summon или скрипт уровня)
#[derive(Event, Debug, Clone)]
pub struct SpawnAgentRequest {
    /// Имя в `ArchetypeCatalog`
    pub archetype: String,
    pub position: Vec3,
    /// Цель нового агента (summon наследует цель призывателя)
    pub target: Option<Entity>,
    pub summoner: Option<Entity>,
}
