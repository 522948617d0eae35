//! SENTINEL Simulation Core
//!
//! ECS-симуляция враждебных агентов на Bevy 0.16 (headless).
//! Один Combat Agent State Machine, параметризованный архетипом:
//! perception → state step → attack scheduling → queue drain.
//!
//! Хост (движок) отвечает за рендер, анимации, навигацию и физику пуль;
//! общается с симуляцией через компоненты (Transform, MovementCommand/Feedback)
//! и события (ProjectileLaunched ↔ ProjectileHit, AgentHook, SpawnAgentRequest).

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod movement;
pub mod scheduler;
pub mod spawn;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AgentArchetype, AgentHook, AgentState, LineOfSightSource, Perception, TargetRef};
pub use clock::SimClock;
pub use combat::{
    Archetype, ArchetypeCatalog, Arsenal, AttackDefinition, AttackEffect, CombatPlugin, DamageDealt,
    DamageRequest, EntityDied, ProjectileHit, ProjectileLaunched, ShotOutcome, ShotResolved,
    SpawnAgentRequest,
};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use movement::HeadlessMovementPlugin;
pub use scheduler::{ActionKind, ActionTag, ScheduledActions};
pub use spawn::agent_bundle;

/// Фазы одного тика симуляции (FixedUpdate, строго последовательно)
///
/// Movement раньше AI: поза цели в AI фазе read-only.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// SimClock.advance
    Clock,
    /// Исполнение MovementCommand (headless или хост)
    Movement,
    /// Урон, смерть
    Health,
    /// Perception query
    Perception,
    /// Cooldowns, state step, steering
    Decision,
    /// Drain scheduled actions, эффекты выстрелов
    Actions,
    /// SpawnAgentRequest → новые агенты
    Spawn,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Не подключает движение: хост либо исполняет MovementCommand сам,
/// либо добавляет `HeadlessMovementPlugin`.
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SimulationConfig {
            seed,
            ..Default::default()
        })
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        logger::set_log_level(self.config.log_level);

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz as f64))
            .insert_resource(SimClock::from_hz(self.config.tick_hz))
            // Детерминистичный RNG (spread, summon offsets)
            .insert_resource(DeterministicRng::new(self.config.seed));

        // Коллабораторы, которые хост мог вставить до plugin'а
        if !app.world().contains_resource::<ArchetypeCatalog>() {
            app.insert_resource(ArchetypeCatalog::builtin());
        }
        if !app.world().contains_resource::<LineOfSightSource>() {
            app.insert_resource(LineOfSightSource::Volumes);
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Clock,
                SimulationSet::Movement,
                SimulationSet::Health,
                SimulationSet::Perception,
                SimulationSet::Decision,
                SimulationSet::Actions,
                SimulationSet::Spawn,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                clock::advance_clock.in_set(SimulationSet::Clock),
                spawn::spawn_requested_agents.in_set(SimulationSet::Spawn),
            ),
        )
        // Подсистемы
        .add_plugins((CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый `app.update()` продвигает ровно один fixed step.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Headless app с полной симуляцией и headless движением
pub fn create_simulation_app(config: SimulationConfig) -> App {
    let mut app = create_headless_app(config.seed);
    let tick = Duration::from_secs_f64(1.0 / config.tick_hz as f64);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .add_plugins((SimulationPlugin::new(config), HeadlessMovementPlugin));
    app
}

/// Прогоняет `ticks` шагов FixedUpdate напрямую (без зависимости от wall time)
pub fn run_ticks(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
