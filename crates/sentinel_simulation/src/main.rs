//! Headless симуляция SENTINEL
//!
//! Демо-энкаунтер: игрок стоит в арене, sentinel boss + пехота + турель за стеной.
//! Пули попадают мгновенно (stand-in для физики хоста).
//!
//! Usage: sentinel_simulation [config.json]

use bevy::prelude::*;
use sentinel_simulation::{
    agent_bundle, create_simulation_app, run_ticks, AgentState, ArchetypeCatalog, Health, Occluder,
    Player, ProjectileHit, ProjectileLaunched, ShotOutcome, ShotResolved, SimulationConfig,
    SimulationSet,
};

const TICKS: u32 = 1800;

/// Хост stand-in: каждая выпущенная пуля попадает в цель
fn instant_projectile_hits(
    mut launched: EventReader<ProjectileLaunched>,
    mut hits: EventWriter<ProjectileHit>,
) {
    for projectile in launched.read() {
        if let Some(target) = projectile.target {
            hits.write(ProjectileHit {
                shooter: projectile.shooter,
                target,
                damage: projectile.damage,
            });
        }
    }
}

fn load_config() -> SimulationConfig {
    match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config {}: {} (using defaults)", path, err);
                SimulationConfig::default()
            }
        },
        None => SimulationConfig::default(),
    }
}

fn main() {
    let config = load_config();
    println!(
        "Starting SENTINEL headless simulation (seed: {}, {} Hz)",
        config.seed, config.tick_hz
    );

    let mut app = create_simulation_app(config);
    app.add_systems(
        FixedUpdate,
        instant_projectile_hits.in_set(SimulationSet::Actions),
    );

    let Some((sentinel, trooper, turret)) = ({
        let catalog = app.world().resource::<ArchetypeCatalog>();
        match (catalog.get("sentinel"), catalog.get("light_trooper"), catalog.get("turret")) {
            (Some(s), Some(l), Some(t)) => Some((s, l, t)),
            _ => None,
        }
    }) else {
        eprintln!("Built-in archetypes missing from catalog");
        return;
    };

    let world = app.world_mut();
    let player = world
        .spawn((
            Player,
            Transform::from_xyz(0.0, 0.0, 0.0),
            Health::new(2000),
            Occluder::body(0.5, 0.8),
        ))
        .id();

    // Агенты смотрят на игрока (forward = -Z)
    world.spawn(agent_bundle(sentinel, Transform::from_xyz(0.0, 0.0, 24.0), Some(player)));
    world.spawn(agent_bundle(trooper.clone(), Transform::from_xyz(-6.0, 0.0, 14.0), Some(player)));
    world.spawn(agent_bundle(trooper, Transform::from_xyz(6.0, 0.0, 14.0), Some(player)));
    world.spawn(agent_bundle(
        turret,
        Transform::from_xyz(-18.0, 0.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y),
        Some(player),
    ));
    // Стена между турелью и игроком
    world.spawn((
        Transform::from_xyz(-9.0, 1.0, 0.0),
        Occluder::wall(Vec3::new(0.2, 2.0, 3.0)),
    ));

    for second in 0..(TICKS / 60) {
        run_ticks(&mut app, 60);

        let world = app.world_mut();
        let mut agents = world.query::<(Entity, &AgentState)>();
        let states: Vec<String> = agents
            .iter(world)
            .map(|(entity, state)| format!("{}:{:?}", entity.index(), state))
            .collect();
        let player_hp = world.get::<Health>(player).map(|h| h.current).unwrap_or(0);

        println!(
            "t={:>2}s player HP {:>4} | {}",
            second + 1,
            player_hp,
            states.join(" ")
        );

        if player_hp == 0 {
            println!("Player died");
            break;
        }
    }

    let shots = app.world().resource::<Events<ShotResolved>>();
    let count = |outcome: ShotOutcome| {
        shots
            .iter_current_update_events()
            .filter(|shot| shot.outcome == outcome)
            .count()
    };
    println!(
        "Shots: {} hit, {} miss, {} launched, {} summoned, {} skipped",
        count(ShotOutcome::Hit),
        count(ShotOutcome::Miss),
        count(ShotOutcome::Launched),
        count(ShotOutcome::Summoned),
        count(ShotOutcome::Skipped),
    );
    println!("Simulation complete!");
}
