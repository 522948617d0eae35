//! Cooldown timer: countdown одной атаки.

use serde::{Deserialize, Serialize};

/// Cooldown между активациями атаки
///
/// Готов когда `remaining == 0`. Армируется в момент *выбора* атаки, не завершения.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CooldownTimer {
    /// Текущий таймер (уменьшается до 0)
    pub remaining: f32,
}

impl CooldownTimer {
    /// Готов к активации (cooldown == 0)
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn arm(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }

    pub fn tick(&mut self, delta: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - delta).max(0.0);
        }
    }
}
