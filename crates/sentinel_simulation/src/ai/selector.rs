//! Attack Selector: выбор ровно одной атаки.
//!
//! Кандидаты: distance ≤ activation_range, cooldown готов, пул оплачивает ammo_cost.
//! Из них: минимальный priority (ничья → порядок объявления в архетипе).
//! Цель должна быть видна, агент не занят.

use crate::combat::{Archetype, Arsenal};

pub fn select_attack(
    archetype: &Archetype,
    arsenal: &Arsenal,
    distance: f32,
    visible: bool,
) -> Option<usize> {
    if arsenal.is_busy() || !visible {
        return None;
    }

    archetype
        .attacks
        .iter()
        .enumerate()
        .filter(|(_, attack)| distance <= attack.activation_range)
        .filter(|(index, _)| arsenal.cooldown_ready(*index))
        .filter(|(_, attack)| arsenal.can_afford(attack))
        .min_by_key(|(index, attack)| (attack.priority, *index))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::BusyLock;

    #[test]
    fn test_priority_one_beats_priority_two() {
        let archetype = Archetype::sentinel();
        let arsenal = Arsenal::for_archetype(&archetype);

        // 5м: laser (p1), summon (p2), shockwave (p3), cannon (p4) все в радиусе
        assert_eq!(select_attack(&archetype, &arsenal, 5.0, true), Some(0));
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let mut archetype = Archetype::sentinel();
        for attack in &mut archetype.attacks {
            attack.priority = 1;
        }
        archetype.attacks.swap(0, 3);
        let arsenal = Arsenal::for_archetype(&archetype);

        assert_eq!(select_attack(&archetype, &arsenal, 5.0, true), Some(0));
        assert_eq!(archetype.attacks[0].id, "cannon");
    }

    #[test]
    fn test_cooldown_and_range_filter() {
        let archetype = Archetype::sentinel();
        let mut arsenal = Arsenal::for_archetype(&archetype);
        arsenal.arm_cooldown(0, 8.0);

        // Laser на cooldown → summon
        assert_eq!(select_attack(&archetype, &arsenal, 5.0, true), Some(1));

        // 32м: в радиусе только summon (35м)
        arsenal.arm_cooldown(1, 15.0);
        assert_eq!(select_attack(&archetype, &arsenal, 32.0, true), None);
    }

    #[test]
    fn test_ammo_gate() {
        let archetype = Archetype::light_trooper();
        let mut arsenal = Arsenal::for_archetype(&archetype);
        arsenal.pools[0].remaining = 0;

        assert_eq!(select_attack(&archetype, &arsenal, 5.0, true), None);

        arsenal.pools[0].remaining = 1;
        assert_eq!(select_attack(&archetype, &arsenal, 5.0, true), Some(0));
    }

    #[test]
    fn test_busy_or_invisible_selects_nothing() {
        let archetype = Archetype::light_trooper();
        let mut arsenal = Arsenal::for_archetype(&archetype);

        assert_eq!(select_attack(&archetype, &arsenal, 5.0, false), None);

        arsenal.busy = Some(BusyLock::Reload { pool: 0 });
        assert_eq!(select_attack(&archetype, &arsenal, 5.0, true), None);
    }
}
