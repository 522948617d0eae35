//! Archetypes: иммутабельная конфигурация типа врага.
//!
//! Архитектура: data-driven composition вместо восьми контроллеров-наследников.
//! Один `Archetype` = perception radii + speeds + ammo pools + список атак.
//! Агенты держат `Arc<Archetype>` (шарится между всеми агентами типа).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::combat::attack::{AmmoConsumption, AttackDefinition, AttackEffect};

#[derive(Debug, Error, PartialEq)]
pub enum ArchetypeError {
    #[error("archetype `{0}` has no attacks")]
    NoAttacks(String),

    #[error("archetype `{archetype}`: duplicate attack id `{attack}`")]
    DuplicateAttack { archetype: String, attack: String },

    #[error("archetype `{archetype}`: attack `{attack}` references missing ammo pool {pool}")]
    MissingPool {
        archetype: String,
        attack: String,
        pool: usize,
    },

    #[error("archetype `{archetype}`: attack `{attack}` has zero burst count")]
    EmptyBurst { archetype: String, attack: String },

    #[error("archetype `{archetype}`: `{field}` must be non-negative and finite")]
    InvalidDuration { archetype: String, field: String },

    #[error("archetype `{0}`: sight range must be positive")]
    InvalidSightRange(String),

    #[error("archetype `{0}`: view half-angle must be in (0, π]")]
    InvalidViewAngle(String),

    #[error("failed to parse archetype catalog: {0}")]
    Parse(String),
}

/// Perception параметры (vision cone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionParams {
    /// Дальность зрения (метры)
    pub sight_range: f32,
    /// Половина угла обзора (радианы)
    pub view_half_angle: f32,
    /// Высота глаз над pivot (метры)
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
    /// Target считается потерянным за `sight_range × lost_sight_factor`
    #[serde(default = "default_lost_sight_factor")]
    pub lost_sight_factor: f32,
    /// Chase → Idle сразу при потере видимости (обычная пехота)
    #[serde(default)]
    pub abandon_on_lost_sight: bool,
}

fn default_eye_height() -> f32 {
    0.8
}

fn default_lost_sight_factor() -> f32 {
    1.5
}

impl PerceptionParams {
    pub fn new(sight_range: f32, view_half_angle_deg: f32) -> Self {
        Self {
            sight_range,
            view_half_angle: view_half_angle_deg.to_radians(),
            eye_height: default_eye_height(),
            lost_sight_factor: default_lost_sight_factor(),
            abandon_on_lost_sight: false,
        }
    }

    /// Дистанция, за которой target потерян (hysteresis)
    pub fn lost_range(&self) -> f32 {
        self.sight_range * self.lost_sight_factor
    }
}

/// Ammo pool конфигурация
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDefinition {
    pub capacity: u32,
    /// Время перезарядки (секунды)
    pub reload_duration: f32,
}

/// Archetype: тип врага
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub perception: PerceptionParams,
    /// Скорость движения (м/с, 0 = стационарный)
    #[serde(default)]
    pub move_speed: f32,
    /// Скорость поворота к цели (рад/с, infinity = мгновенно)
    ///
    /// Infinity в JSON не представим: такое поле не пишется и при загрузке
    /// восстанавливается из default.
    #[serde(default = "default_turn_rate", skip_serializing_if = "is_snap_turn")]
    pub turn_rate: f32,
    /// Chase останавливается ближе этой дистанции
    #[serde(default)]
    pub stopping_distance: f32,
    #[serde(default = "default_max_health")]
    pub max_health: u32,
    #[serde(default)]
    pub pools: Vec<PoolDefinition>,
    pub attacks: Vec<AttackDefinition>,
    /// Окно death анимации/cleanup до despawn (секунды)
    #[serde(default = "default_death_cleanup")]
    pub death_cleanup: f32,
}

fn default_turn_rate() -> f32 {
    f32::INFINITY
}

fn is_snap_turn(turn_rate: &f32) -> bool {
    turn_rate.is_infinite()
}

fn default_max_health() -> u32 {
    100
}

fn default_death_cleanup() -> f32 {
    3.0
}

impl Archetype {
    /// Проверка согласованности (ссылки на пулы, длительности, perception)
    pub fn validate(self) -> Result<Self, ArchetypeError> {
        let name = self.name.clone();

        if self.attacks.is_empty() {
            return Err(ArchetypeError::NoAttacks(name));
        }
        if !(self.perception.sight_range > 0.0) {
            return Err(ArchetypeError::InvalidSightRange(name));
        }
        let half_angle = self.perception.view_half_angle;
        if !(half_angle > 0.0 && half_angle <= std::f32::consts::PI) {
            return Err(ArchetypeError::InvalidViewAngle(name));
        }

        let check = |field: String, value: f32| -> Result<(), ArchetypeError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ArchetypeError::InvalidDuration {
                    archetype: name.clone(),
                    field,
                })
            }
        };

        check("death_cleanup".into(), self.death_cleanup)?;
        for (index, pool) in self.pools.iter().enumerate() {
            check(format!("pools[{index}].reload_duration"), pool.reload_duration)?;
        }

        let mut seen = HashSet::new();
        for attack in &self.attacks {
            if !seen.insert(attack.id.as_str()) {
                return Err(ArchetypeError::DuplicateAttack {
                    archetype: name.clone(),
                    attack: attack.id.clone(),
                });
            }
            if let Some(pool) = attack.pool {
                if pool >= self.pools.len() {
                    return Err(ArchetypeError::MissingPool {
                        archetype: name.clone(),
                        attack: attack.id.clone(),
                        pool,
                    });
                }
            }
            if attack.burst_count == 0 {
                return Err(ArchetypeError::EmptyBurst {
                    archetype: name.clone(),
                    attack: attack.id.clone(),
                });
            }
            check(format!("{}.cooldown_duration", attack.id), attack.cooldown_duration)?;
            check(format!("{}.burst_interval", attack.id), attack.burst_interval)?;
            check(format!("{}.recovery_duration", attack.id), attack.recovery_duration)?;
            check(format!("{}.charge_duration", attack.id), attack.charge_duration)?;
        }

        Ok(self)
    }

    /// Минимальный ammo_cost среди атак, стреляющих из пула
    ///
    /// Пул, который не может оплатить ни одну свою атаку, считается пустым.
    pub fn min_cost_for_pool(&self, pool: usize) -> Option<u32> {
        self.attacks
            .iter()
            .filter(|a| a.pool == Some(pool))
            .map(|a| a.ammo_cost.max(1))
            .min()
    }

    /// Light infantry: rifle burst из общего магазина на 10
    pub fn light_trooper() -> Self {
        let mut perception = PerceptionParams::new(15.0, 45.0);
        perception.abandon_on_lost_sight = true;

        Self {
            name: "light_trooper".into(),
            perception,
            move_speed: 3.5,
            turn_rate: 6.0,
            stopping_distance: 8.0,
            max_health: 60,
            pools: vec![PoolDefinition {
                capacity: 10,
                reload_duration: 2.0,
            }],
            attacks: vec![AttackDefinition::rifle_burst("rifle_burst", 0)],
            death_cleanup: 2.0,
        }
    }

    /// Chaser: быстрый melee без патронов
    pub fn chaser() -> Self {
        let mut perception = PerceptionParams::new(18.0, 70.0);
        perception.abandon_on_lost_sight = true;

        Self {
            name: "chaser".into(),
            perception,
            move_speed: 6.0,
            turn_rate: 10.0,
            stopping_distance: 1.5,
            max_health: 40,
            pools: Vec::new(),
            attacks: vec![AttackDefinition::lunge("lunge")],
            death_cleanup: 1.5,
        }
    }

    /// Turret: стационарный beam, широкий сектор
    pub fn turret() -> Self {
        Self {
            name: "turret".into(),
            perception: PerceptionParams::new(25.0, 60.0),
            move_speed: 0.0,
            turn_rate: 2.0,
            stopping_distance: 0.0,
            max_health: 150,
            pools: vec![PoolDefinition {
                capacity: 30,
                reload_duration: 3.0,
            }],
            attacks: vec![AttackDefinition {
                id: "beam_burst".into(),
                priority: 1,
                activation_range: 25.0,
                cooldown_duration: 1.5,
                pool: Some(0),
                ammo_cost: 1,
                consumption: AmmoConsumption::PerShot,
                burst_count: 5,
                burst_interval: 0.15,
                recovery_duration: 0.5,
                charge_duration: 0.0,
                effect: AttackEffect::Beam { damage: 5 },
            }],
            death_cleanup: 4.0,
        }
    }

    /// Cannon: тяжёлый одиночный выстрел, per-activation расход
    pub fn cannon() -> Self {
        Self {
            name: "cannon".into(),
            perception: PerceptionParams::new(30.0, 35.0),
            move_speed: 0.0,
            turn_rate: 1.0,
            stopping_distance: 0.0,
            max_health: 200,
            pools: vec![PoolDefinition {
                capacity: 4,
                reload_duration: 3.0,
            }],
            attacks: vec![AttackDefinition {
                id: "cannon_shell".into(),
                priority: 1,
                activation_range: 30.0,
                cooldown_duration: 2.5,
                pool: Some(0),
                ammo_cost: 1,
                consumption: AmmoConsumption::PerActivation,
                burst_count: 1,
                burst_interval: 0.0,
                recovery_duration: 1.0,
                charge_duration: 0.0,
                effect: AttackEffect::Projectile {
                    damage: 30,
                    speed: 25.0,
                    spread: 0.02,
                },
            }],
            death_cleanup: 4.0,
        }
    }

    /// Sentinel boss: laser > summon > shockwave > cannon
    ///
    /// Порядок приоритетов фиксированный: дальние способности предпочитаются
    /// ближним, когда обе готовы.
    pub fn sentinel() -> Self {
        Self {
            name: "sentinel".into(),
            perception: PerceptionParams::new(35.0, 90.0),
            move_speed: 2.0,
            turn_rate: 1.5,
            stopping_distance: 10.0,
            max_health: 1500,
            pools: vec![PoolDefinition {
                capacity: 12,
                reload_duration: 4.0,
            }],
            attacks: vec![
                AttackDefinition {
                    id: "laser".into(),
                    priority: 1,
                    activation_range: 30.0,
                    cooldown_duration: 8.0,
                    pool: None,
                    ammo_cost: 0,
                    consumption: AmmoConsumption::PerShot,
                    burst_count: 1,
                    burst_interval: 0.0,
                    recovery_duration: 1.5,
                    charge_duration: 1.2,
                    effect: AttackEffect::Beam { damage: 40 },
                },
                AttackDefinition {
                    id: "summon".into(),
                    priority: 2,
                    activation_range: 35.0,
                    cooldown_duration: 15.0,
                    pool: None,
                    ammo_cost: 0,
                    consumption: AmmoConsumption::PerShot,
                    burst_count: 1,
                    burst_interval: 0.0,
                    recovery_duration: 1.0,
                    charge_duration: 1.5,
                    effect: AttackEffect::Summon {
                        archetype: "chaser".into(),
                        count: 3,
                        radius: 4.0,
                    },
                },
                AttackDefinition {
                    id: "shockwave".into(),
                    priority: 3,
                    activation_range: 6.0,
                    cooldown_duration: 5.0,
                    pool: None,
                    ammo_cost: 0,
                    consumption: AmmoConsumption::PerShot,
                    burst_count: 1,
                    burst_interval: 0.0,
                    recovery_duration: 1.0,
                    charge_duration: 1.0,
                    effect: AttackEffect::Area {
                        damage: 25,
                        radius: 6.0,
                    },
                },
                AttackDefinition {
                    id: "cannon".into(),
                    priority: 4,
                    activation_range: 25.0,
                    cooldown_duration: 1.0,
                    pool: Some(0),
                    ammo_cost: 1,
                    consumption: AmmoConsumption::PerShot,
                    burst_count: 3,
                    burst_interval: 0.25,
                    recovery_duration: 0.5,
                    charge_duration: 0.0,
                    effect: AttackEffect::Projectile {
                        damage: 12,
                        speed: 30.0,
                        spread: 0.08,
                    },
                },
            ],
            death_cleanup: 6.0,
        }
    }
}

/// Каталог архетипов (name → Arc<Archetype>)
///
/// Используется спавном (summon, scripted spawn) вместо глобального lookup по имени prefab'а.
#[derive(Resource, Debug, Clone, Default)]
pub struct ArchetypeCatalog {
    archetypes: HashMap<String, Arc<Archetype>>,
}

impl ArchetypeCatalog {
    /// Встроенные архетипы
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for archetype in [
            Archetype::light_trooper(),
            Archetype::chaser(),
            Archetype::turret(),
            Archetype::cannon(),
            Archetype::sentinel(),
        ] {
            catalog.archetypes.insert(archetype.name.clone(), Arc::new(archetype));
        }
        catalog
    }

    /// JSON: массив архетипов. Каждый валидируется.
    pub fn from_json_str(json: &str) -> Result<Self, ArchetypeError> {
        let list: Vec<Archetype> =
            serde_json::from_str(json).map_err(|e| ArchetypeError::Parse(e.to_string()))?;

        let mut catalog = Self::default();
        for archetype in list {
            catalog.insert(archetype)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, archetype: Archetype) -> Result<Arc<Archetype>, ArchetypeError> {
        let archetype = Arc::new(archetype.validate()?);
        self.archetypes
            .insert(archetype.name.clone(), Arc::clone(&archetype));
        Ok(archetype)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Archetype>> {
        self.archetypes.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
