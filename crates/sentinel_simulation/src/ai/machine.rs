//! Agent State Machine: единый контроллер для всех архетипов.
//!
//! `AgentContext` собирает мутабельное состояние одного агента на время
//! одного вызова (step / resolve / enter_dead). Ничего не знает о Bevy World:
//! эффекты выстрелов возвращаются как `Directive`, hooks складываются в буфер.
//!
//! Переходы:
//! - Idle → Chase: цель видна
//! - Chase/Engage → Idle: цель потеряна (дальше sight × lost_sight_factor)
//! - Chase → Engage/Charging/Summoning: атака выбрана
//! - Engage → Chase: выбирать нечего
//! - конец атаки → Reloading (пул пуст) или re-evaluate
//! - Reloading → re-evaluate после reload_duration
//! - любое → Dead (health collaborator), terminal

use bevy::prelude::*;

use crate::ai::components::{AgentState, Perception};
use crate::ai::events::AgentHook;
use crate::ai::selector::select_attack;
use crate::combat::{AmmoConsumption, Archetype, Arsenal, BusyLock};
use crate::scheduler::{ActionKind, ActionTag, ScheduledActions};

/// Что drain должен сделать в мире после `resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Nothing,
    /// Fire step атаки. `loaded == false` → пул пуст, выстрел пропущен.
    Shoot { attack: usize, shot: u32, loaded: bool },
    /// Terminal cleanup окончен
    Despawn,
}

pub struct AgentContext<'a> {
    pub entity: Entity,
    pub archetype: &'a Archetype,
    pub state: &'a mut AgentState,
    pub arsenal: &'a mut Arsenal,
    pub actions: &'a mut ScheduledActions,
    pub perception: &'a Perception,
    /// `SimClock::elapsed_secs`
    pub now: f64,
    pub hooks: &'a mut Vec<AgentHook>,
}

impl AgentContext<'_> {
    /// Per-tick transition rule текущего состояния
    ///
    /// Пока агент занят (атака или reload), ничего не решается: потеря цели
    /// откладывается до конца последовательности.
    pub fn step(&mut self) {
        if self.state.is_dead() || self.arsenal.is_busy() {
            return;
        }

        match *self.state {
            AgentState::Idle => {
                if self.perception.visible {
                    self.transition(AgentState::Chase);
                }
            }
            AgentState::Chase | AgentState::Engage => {
                if self.target_lost() {
                    self.transition(AgentState::Idle);
                    return;
                }
                if let Some(attack) = self.select() {
                    self.begin_attack(attack);
                } else if *self.state == AgentState::Engage {
                    self.transition(AgentState::Chase);
                }
            }
            AgentState::Reloading
            | AgentState::Charging
            | AgentState::Summoning
            | AgentState::Recovering => self.reevaluate(),
            AgentState::Dead => {}
        }
    }

    /// Обработка созревшего scheduled action
    pub fn resolve(&mut self, tag: ActionTag) -> Directive {
        if self.state.is_dead() {
            // Callbacks мёртвого агента отбрасываются (кроме terminal cleanup)
            return match tag {
                ActionTag::Despawn => Directive::Despawn,
                _ => Directive::Nothing,
            };
        }

        match tag {
            ActionTag::Fire { attack, shot } => {
                if self.arsenal.busy != Some(BusyLock::Attack { attack }) {
                    return Directive::Nothing;
                }
                if *self.state == AgentState::Charging {
                    self.transition(AgentState::Engage);
                }
                let archetype = self.archetype;
                let loaded = match archetype.attacks.get(attack) {
                    Some(definition) => self.arsenal.take_shot(definition),
                    None => false,
                };
                Directive::Shoot {
                    attack,
                    shot,
                    loaded,
                }
            }
            ActionTag::EnterRecovery { attack } => {
                if self.arsenal.busy == Some(BusyLock::Attack { attack }) {
                    self.transition(AgentState::Recovering);
                }
                Directive::Nothing
            }
            ActionTag::Complete { attack } => {
                self.complete_attack(attack);
                Directive::Nothing
            }
            ActionTag::ReloadComplete { pool } => {
                self.finish_reload(pool);
                Directive::Nothing
            }
            ActionTag::Despawn => Directive::Despawn,
        }
    }

    /// Health reached zero. Отменяет всё pending, ставит non-cancelable despawn.
    pub fn enter_dead(&mut self) {
        if self.state.is_dead() {
            return;
        }

        let cancelled = self.actions.cancel_all();
        self.arsenal.busy = None;
        self.transition(AgentState::Dead);
        self.hooks.push(AgentHook::Died { agent: self.entity });
        self.actions.push_uncancelable(
            self.now + self.archetype.death_cleanup as f64,
            ActionTag::Despawn,
        );

        crate::logger::log_info(&format!(
            "💀 {} {:?} died ({} pending actions cancelled, despawn in {:.1}s)",
            self.archetype.name, self.entity, cancelled, self.archetype.death_cleanup
        ));
    }

    fn target_lost(&self) -> bool {
        let perception = self.perception;
        let params = &self.archetype.perception;

        perception.target.is_none()
            || perception.distance > params.lost_range()
            || (params.abandon_on_lost_sight && !perception.visible)
    }

    fn select(&self) -> Option<usize> {
        select_attack(
            self.archetype,
            self.arsenal,
            self.perception.distance,
            self.perception.visible,
        )
    }

    /// Выбор атаки: cooldown армируется сразу, последовательность ставится в очередь
    fn begin_attack(&mut self, index: usize) {
        let archetype = self.archetype;
        let Some(attack) = archetype.attacks.get(index) else {
            return;
        };

        self.arsenal.arm_cooldown(index, attack.cooldown_duration);
        if attack.consumption == AmmoConsumption::PerActivation {
            self.arsenal.pay_activation(attack);
        }
        self.arsenal.busy = Some(BusyLock::Attack { attack: index });

        let opening = if attack.is_summon() {
            AgentState::Summoning
        } else if attack.charge_duration > 0.0 {
            AgentState::Charging
        } else {
            AgentState::Engage
        };
        self.transition(opening);

        for shot in 0..attack.burst_count {
            self.actions.push(
                self.now + attack.shot_offset(shot) as f64,
                ActionTag::Fire {
                    attack: index,
                    shot,
                },
            );
        }
        if attack.is_committed() && attack.recovery_duration > 0.0 {
            self.actions.push(
                self.now + attack.last_shot_offset() as f64,
                ActionTag::EnterRecovery { attack: index },
            );
        }
        self.actions.push(
            self.now + attack.sequence_duration() as f64,
            ActionTag::Complete { attack: index },
        );

        self.hooks.push(AgentHook::AttackTriggered {
            agent: self.entity,
            attack: attack.id.clone(),
        });

        crate::logger::log(&format!(
            "⚔️ {} {:?} → {} ({} shots, distance {:.1})",
            archetype.name, self.entity, attack.id, attack.burst_count, self.perception.distance
        ));
    }

    fn complete_attack(&mut self, index: usize) {
        if self.arsenal.busy != Some(BusyLock::Attack { attack: index }) {
            return;
        }
        self.arsenal.busy = None;

        let pool = self.archetype.attacks.get(index).and_then(|a| a.pool);
        match pool {
            Some(pool) if self.arsenal.needs_reload(self.archetype, pool) => self.start_reload(pool),
            _ => self.reevaluate(),
        }
    }

    fn start_reload(&mut self, pool: usize) {
        let archetype = self.archetype;
        let Some(definition) = archetype.pools.get(pool) else {
            self.reevaluate();
            return;
        };

        // Перезапуск reload не должен оставлять старый таймер
        self.actions.cancel_kind(ActionKind::Reload);
        self.arsenal.busy = Some(BusyLock::Reload { pool });
        self.transition(AgentState::Reloading);
        self.actions.push(
            self.now + definition.reload_duration as f64,
            ActionTag::ReloadComplete { pool },
        );
        self.hooks.push(AgentHook::ReloadStarted {
            agent: self.entity,
            pool,
        });

        crate::logger::log_info(&format!(
            "🔄 {} {:?} reloading pool {} ({:.1}s)",
            archetype.name, self.entity, pool, definition.reload_duration
        ));
    }

    fn finish_reload(&mut self, pool: usize) {
        if self.arsenal.busy != Some(BusyLock::Reload { pool }) {
            return;
        }
        self.arsenal.refill(pool);
        self.arsenal.busy = None;
        self.reevaluate();
    }

    /// Engage / Chase / Idle по текущей perception
    fn reevaluate(&mut self) {
        if self.target_lost() {
            self.transition(AgentState::Idle);
        } else if let Some(attack) = self.select() {
            self.begin_attack(attack);
        } else {
            self.transition(AgentState::Chase);
        }
    }

    fn transition(&mut self, next: AgentState) {
        if *self.state == next {
            return;
        }
        crate::logger::log(&format!(
            "🤖 {} {:?}: {:?} → {:?}",
            self.archetype.name, self.entity, *self.state, next
        ));
        *self.state = next;
    }
}
