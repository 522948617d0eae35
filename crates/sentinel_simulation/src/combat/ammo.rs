//! Ammo pool: bounded counter патронов.
//!
//! Инвариант: 0 ≤ remaining ≤ capacity. `consume()` на пустом пуле: тихий no-op.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoPool {
    pub remaining: u32,
    pub capacity: u32,
}

impl AmmoPool {
    pub fn new(capacity: u32) -> Self {
        Self {
            remaining: capacity,
            capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.remaining >= cost
    }

    /// Один патрон. `false` если пул пуст (ничего не списано).
    pub fn consume(&mut self) -> bool {
        self.consume_n(1)
    }

    /// `n` патронов разом (per-activation атаки). Всё или ничего.
    pub fn consume_n(&mut self, n: u32) -> bool {
        if self.can_afford(n) {
            self.remaining -= n;
            true
        } else {
            false
        }
    }

    /// Полная перезарядка (частичной нет)
    pub fn refill(&mut self) {
        self.remaining = self.capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_until_empty() {
        let mut pool = AmmoPool::new(3);
        assert!(pool.consume());
        assert!(pool.consume());
        assert!(pool.consume());
        assert!(pool.is_empty());

        // Пустой пул не уходит в минус
        assert!(!pool.consume());
        assert_eq!(pool.remaining, 0);
    }

    #[test]
    fn test_consume_n_is_all_or_nothing() {
        let mut pool = AmmoPool::new(5);
        assert!(pool.consume_n(4));
        assert_eq!(pool.remaining, 1);

        assert!(!pool.consume_n(2));
        assert_eq!(pool.remaining, 1);
    }

    #[test]
    fn test_refill_restores_capacity() {
        let mut pool = AmmoPool::new(10);
        pool.consume_n(10);
        assert!(pool.is_empty());

        pool.refill();
        assert_eq!(pool.remaining, 10);
        assert!(pool.remaining <= pool.capacity);
    }
}
