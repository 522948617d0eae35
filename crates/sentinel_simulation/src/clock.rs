//! Simulation clock: monotonic tick counter с фиксированным интервалом.
//!
//! Все таймеры симуляции (cooldowns, scheduled actions, headless movement) читают
//! `SimClock`, а не wall time: один прогон `FixedUpdate` = один тик.

use bevy::prelude::*;

/// Fixed-step clock resource
///
/// `elapsed` считается как `tick × interval` (без накопления ошибки float).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    tick: u64,
    tick_interval: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_hz(60.0)
    }
}

impl SimClock {
    pub fn new(tick_interval: f32) -> Self {
        Self {
            tick: 0,
            tick_interval: tick_interval.max(f32::EPSILON),
        }
    }

    pub fn from_hz(hz: f32) -> Self {
        Self::new(1.0 / hz.max(f32::EPSILON))
    }

    /// Номер текущего тика (0 до первого advance)
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Длительность одного тика (секунды)
    pub fn delta_secs(&self) -> f32 {
        self.tick_interval
    }

    /// Время с начала симуляции (секунды)
    pub fn elapsed_secs(&self) -> f64 {
        self.tick as f64 * self.tick_interval as f64
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

/// System: один шаг симуляции (первой в FixedUpdate)
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = SimClock::from_hz(10.0);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed_secs(), 0.0);

        let mut last = clock.elapsed_secs();
        for _ in 0..100 {
            clock.advance();
            assert!(clock.elapsed_secs() > last);
            last = clock.elapsed_secs();
        }
        assert_eq!(clock.tick(), 100);
        assert!((clock.elapsed_secs() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_clock_default_is_60hz() {
        let clock = SimClock::default();
        assert!((clock.delta_secs() - 1.0 / 60.0).abs() < 1e-7);
    }
}
