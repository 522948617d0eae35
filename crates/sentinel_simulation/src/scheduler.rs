//! Scheduled Action Queue: отложенные действия агента без блокировки тика.
//!
//! "сделай A, через delay B, ещё через delay C" = несколько записей с fire-time.
//! Записи упорядочены по `(fire_at, seq)`: при равном времени: в порядке постановки.
//! Cancel-all (смерть) и cancel-by-kind (перезапуск reload). Despawn ставится
//! non-cancelable и переживает cancel-all.

use bevy::prelude::*;

/// Допуск сравнения fire-time с часами (f32 длительности → f64 время)
const DUE_EPSILON: f64 = 1e-6;

/// Typed tag отложенного действия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTag {
    /// Выстрел номер `shot` атаки `attack`
    Fire { attack: usize, shot: u32 },
    /// Последний выстрел committed атаки → Recovering
    EnterRecovery { attack: usize },
    /// Конец последовательности атаки (снимает busy)
    Complete { attack: usize },
    /// Перезарядка пула завершена
    ReloadComplete { pool: usize },
    /// Terminal cleanup после смерти
    Despawn,
}

/// Категория тега для cancel-by-kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Fire,
    Recovery,
    Complete,
    Reload,
    Despawn,
}

impl ActionTag {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionTag::Fire { .. } => ActionKind::Fire,
            ActionTag::EnterRecovery { .. } => ActionKind::Recovery,
            ActionTag::Complete { .. } => ActionKind::Complete,
            ActionTag::ReloadComplete { .. } => ActionKind::Reload,
            ActionTag::Despawn => ActionKind::Despawn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction {
    /// Время срабатывания (секунды `SimClock`)
    pub fire_at: f64,
    /// Порядковый номер постановки (tie-break)
    pub seq: u64,
    pub tag: ActionTag,
    pub cancelable: bool,
}

#[derive(Component, Debug, Clone, Default)]
pub struct ScheduledActions {
    queue: Vec<ScheduledAction>,
    next_seq: u64,
}

impl ScheduledActions {
    pub fn push(&mut self, fire_at: f64, tag: ActionTag) -> u64 {
        self.insert(fire_at, tag, true)
    }

    /// Не снимается `cancel_all` / `cancel_kind`
    pub fn push_uncancelable(&mut self, fire_at: f64, tag: ActionTag) -> u64 {
        self.insert(fire_at, tag, false)
    }

    fn insert(&mut self, fire_at: f64, tag: ActionTag, cancelable: bool) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        // seq монотонен → новая запись идёт после всех с тем же fire_at
        let index = self.queue.partition_point(|a| a.fire_at <= fire_at);
        self.queue.insert(
            index,
            ScheduledAction {
                fire_at,
                seq,
                tag,
                cancelable,
            },
        );
        seq
    }

    /// Seq, который получит следующая запись.
    ///
    /// Drain снимает snapshot перед обработкой: действия, поставленные
    /// во время drain (seq ≥ snapshot), ждут следующего тика.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Следующее созревшее действие с `seq < seq_limit`
    pub fn pop_due(&mut self, now: f64, seq_limit: u64) -> Option<ScheduledAction> {
        let index = self
            .queue
            .iter()
            .take_while(|a| a.fire_at <= now + DUE_EPSILON)
            .position(|a| a.seq < seq_limit)?;
        Some(self.queue.remove(index))
    }

    /// Снять все cancelable записи. Возвращает количество снятых.
    pub fn cancel_all(&mut self) -> usize {
        let before = self.queue.len();
        self.queue.retain(|a| !a.cancelable);
        before - self.queue.len()
    }

    pub fn cancel_kind(&mut self, kind: ActionKind) -> usize {
        let before = self.queue.len();
        self.queue
            .retain(|a| !(a.cancelable && a.tag.kind() == kind));
        before - self.queue.len()
    }

    pub fn contains_kind(&self, kind: ActionKind) -> bool {
        self.queue.iter().any(|a| a.tag.kind() == kind)
    }

    pub fn next_fire_at(&self) -> Option<f64> {
        self.queue.first().map(|a| a.fire_at)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledAction> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
