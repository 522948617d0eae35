//! Attack definitions: статические дескрипторы атак архетипа.
//!
//! Одна структура на все варианты (beam, ballistic, area, summon):
//! - priority / activation_range / cooldown: для Attack Selector
//! - burst_count / burst_interval / recovery / charge: форма последовательности
//! - effect: что делает каждый fire step
//!
//! Атака иммутабельна и шарится между агентами одного архетипа.

use serde::{Deserialize, Serialize};

/// Как атака тратит патроны
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AmmoConsumption {
    /// Каждый выстрел burst'а тратит 1 патрон; выбор только проверяет `ammo_cost`
    #[default]
    PerShot,
    /// Выбор атаки сразу списывает `ammo_cost`; выстрелы патронов не тратят
    PerActivation,
}

/// Эффект одного fire step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackEffect {
    /// Hitscan raycast (лазер, пушка прямой наводки)
    Beam { damage: u32 },

    /// Physics-propelled projectile; попадание репортит хост через `ProjectileHit`
    Projectile {
        damage: u32,
        /// Скорость пули (м/с)
        speed: f32,
        /// Максимальное отклонение направления (радианы)
        spread: f32,
    },

    /// Удар по области вокруг агента (shockwave, lunge)
    Area { damage: u32, radius: f32 },

    /// Призыв миньонов
    Summon {
        /// Имя архетипа в `ArchetypeCatalog`
        archetype: String,
        count: u32,
        /// Радиус разброса точек спавна (метры)
        radius: f32,
    },
}

/// Attack definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    /// Stable id (для hooks/анимаций)
    pub id: String,

    /// Меньше = проверяется раньше
    pub priority: u32,

    /// Максимальная дистанция активации (метры)
    pub activation_range: f32,

    /// Cooldown между активациями (секунды)
    pub cooldown_duration: f32,

    /// Индекс ammo pool в архетипе (`None` = бесконечные патроны)
    #[serde(default)]
    pub pool: Option<usize>,

    /// Минимум патронов для выбора (или списание при PerActivation)
    #[serde(default)]
    pub ammo_cost: u32,

    #[serde(default)]
    pub consumption: AmmoConsumption,

    /// Количество выстрелов в burst'е
    pub burst_count: u32,

    /// Интервал между выстрелами burst'а (секунды)
    #[serde(default)]
    pub burst_interval: f32,

    /// Окно восстановления после последнего выстрела (секунды)
    #[serde(default)]
    pub recovery_duration: f32,

    /// Telegraph перед первым выстрелом (секунды, 0 = без замаха)
    #[serde(default)]
    pub charge_duration: f32,

    pub effect: AttackEffect,
}

impl AttackDefinition {
    /// High-commitment атака: есть charge telegraph или это summon.
    ///
    /// Такие атаки переводят агента в Charging/Summoning → Recovering,
    /// движение и поворот за целью подавлены.
    pub fn is_committed(&self) -> bool {
        self.charge_duration > 0.0 || self.is_summon()
    }

    pub fn is_summon(&self) -> bool {
        matches!(self.effect, AttackEffect::Summon { .. })
    }

    /// Время (от момента выбора) выстрела номер `shot`
    pub fn shot_offset(&self, shot: u32) -> f32 {
        self.charge_duration + shot as f32 * self.burst_interval
    }

    /// Время (от момента выбора) последнего выстрела
    pub fn last_shot_offset(&self) -> f32 {
        self.shot_offset(self.burst_count.saturating_sub(1))
    }

    /// Полная длительность последовательности: charge + burst + recovery
    pub fn sequence_duration(&self) -> f32 {
        self.last_shot_offset() + self.recovery_duration
    }

    /// Rifle burst (light infantry)
    pub fn rifle_burst(id: impl Into<String>, pool: usize) -> Self {
        Self {
            id: id.into(),
            priority: 1,
            activation_range: 12.0,
            cooldown_duration: 0.8,
            pool: Some(pool),
            ammo_cost: 1,
            consumption: AmmoConsumption::PerShot,
            burst_count: 3,
            burst_interval: 0.1,
            recovery_duration: 0.4,
            charge_duration: 0.0,
            effect: AttackEffect::Projectile {
                damage: 8,
                speed: 60.0,
                spread: 0.05,
            },
        }
    }

    /// Melee lunge (chaser)
    pub fn lunge(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: 1,
            activation_range: 2.0,
            cooldown_duration: 1.2,
            pool: None,
            ammo_cost: 0,
            consumption: AmmoConsumption::PerShot,
            burst_count: 1,
            burst_interval: 0.0,
            recovery_duration: 0.5,
            charge_duration: 0.0,
            effect: AttackEffect::Area {
                damage: 15,
                radius: 2.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_offsets() {
        let attack = AttackDefinition::rifle_burst("rifle", 0);
        assert_eq!(attack.shot_offset(0), 0.0);
        assert!((attack.shot_offset(2) - 0.2).abs() < 1e-6);
        assert!((attack.sequence_duration() - 0.6).abs() < 1e-6);
        assert!(!attack.is_committed());
    }

    #[test]
    fn test_charge_shifts_every_shot() {
        let mut attack = AttackDefinition::lunge("slam");
        attack.charge_duration = 1.5;
        assert_eq!(attack.shot_offset(0), 1.5);
        assert_eq!(attack.sequence_duration(), 2.0);
        assert!(attack.is_committed());
    }

    #[test]
    fn test_summon_is_committed() {
        let mut attack = AttackDefinition::lunge("summon");
        attack.effect = AttackEffect::Summon {
            archetype: "chaser".into(),
            count: 3,
            radius: 4.0,
        };
        assert!(attack.is_summon());
        assert!(attack.is_committed());
    }
}
