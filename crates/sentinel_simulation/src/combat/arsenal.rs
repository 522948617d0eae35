//! Arsenal: per-agent mutable боевое состояние.
//!
//! Cooldown на каждую атаку архетипа, ammo pools, busy lock.
//! Индексы совпадают с `Archetype::attacks` / `Archetype::pools`.

use bevy::prelude::*;

use crate::combat::ammo::AmmoPool;
use crate::combat::archetype::Archetype;
use crate::combat::attack::{AmmoConsumption, AttackDefinition};
use crate::combat::cooldown::CooldownTimer;

/// Что держит агента занятым (блокирует выбор атаки)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyLock {
    /// Идёт последовательность атаки (charge → burst → recovery)
    Attack { attack: usize },
    /// Идёт перезарядка пула
    Reload { pool: usize },
}

#[derive(Component, Debug, Clone, Default)]
pub struct Arsenal {
    pub cooldowns: Vec<CooldownTimer>,
    pub pools: Vec<AmmoPool>,
    pub busy: Option<BusyLock>,
}

impl Arsenal {
    /// Spawn state: полные пулы, все cooldowns готовы
    pub fn for_archetype(archetype: &Archetype) -> Self {
        Self {
            cooldowns: vec![CooldownTimer::default(); archetype.attacks.len()],
            pools: archetype
                .pools
                .iter()
                .map(|pool| AmmoPool::new(pool.capacity))
                .collect(),
            busy: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn cooldown_ready(&self, attack: usize) -> bool {
        self.cooldowns
            .get(attack)
            .map(CooldownTimer::is_ready)
            .unwrap_or(false)
    }

    pub fn arm_cooldown(&mut self, attack: usize, duration: f32) {
        if let Some(cooldown) = self.cooldowns.get_mut(attack) {
            cooldown.arm(duration);
        }
    }

    /// Пул содержит ≥ `ammo_cost` (атаки без пула: бесконечные патроны)
    pub fn can_afford(&self, attack: &AttackDefinition) -> bool {
        match attack.pool {
            None => true,
            Some(pool) => self
                .pools
                .get(pool)
                .map(|p| p.can_afford(attack.ammo_cost))
                .unwrap_or(false),
        }
    }

    /// Списание при выборе (только PerActivation)
    pub fn pay_activation(&mut self, attack: &AttackDefinition) -> bool {
        match (attack.consumption, attack.pool) {
            (AmmoConsumption::PerActivation, Some(pool)) => self
                .pools
                .get_mut(pool)
                .map(|p| p.consume_n(attack.ammo_cost))
                .unwrap_or(false),
            _ => true,
        }
    }

    /// Один выстрел burst'а. `false` = пул пуст, выстрел пропускается.
    pub fn take_shot(&mut self, attack: &AttackDefinition) -> bool {
        match (attack.consumption, attack.pool) {
            (AmmoConsumption::PerShot, Some(pool)) => self
                .pools
                .get_mut(pool)
                .map(AmmoPool::consume)
                .unwrap_or(false),
            _ => true,
        }
    }

    /// Пул не может оплатить ни одну атаку, которая из него стреляет
    pub fn needs_reload(&self, archetype: &Archetype, pool: usize) -> bool {
        let Some(ammo) = self.pools.get(pool) else {
            return false;
        };
        match archetype.min_cost_for_pool(pool) {
            Some(cost) => !ammo.can_afford(cost),
            None => ammo.is_empty(),
        }
    }

    pub fn refill(&mut self, pool: usize) {
        if let Some(ammo) = self.pools.get_mut(pool) {
            ammo.refill();
        }
    }

    pub fn tick(&mut self, delta: f32) {
        for cooldown in &mut self.cooldowns {
            cooldown.tick(delta);
        }
    }
}
