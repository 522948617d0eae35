//! Agent integration tests
//!
//! Полный FixedUpdate pipeline (perception → decision → drain) headless:
//! - Engage → Reload цикл и reload routing
//! - Perception gating (range, view cone, стены)
//! - Смерть посреди burst'а
//! - Приоритеты атак, summon, busy lock

use bevy::prelude::*;
use sentinel_simulation::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Helper: simulation app 60Hz
fn create_agent_app() -> App {
    create_simulation_app(SimulationConfig::default())
}

fn archetype(app: &App, name: &str) -> Arc<Archetype> {
    app.world()
        .resource::<ArchetypeCatalog>()
        .get(name)
        .unwrap_or_else(|| panic!("archetype {} missing", name))
}

/// Helper: цель с телом (видна через occlusion raycast)
fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            Transform::from_translation(position),
            Health::new(1000),
            Occluder::body(0.5, 0.8),
        ))
        .id()
}

/// Helper: агент в начале координат, смотрит в -Z
fn spawn_agent(app: &mut App, name: &str, target: Entity) -> Entity {
    let archetype = archetype(app, name);
    app.world_mut()
        .spawn(agent_bundle(archetype, Transform::default(), Some(target)))
        .id()
}

fn shots_of(app: &App, agent: Entity) -> Vec<ShotResolved> {
    app.world()
        .resource::<Events<ShotResolved>>()
        .iter_current_update_events()
        .filter(|shot| shot.agent == agent)
        .cloned()
        .collect()
}

fn hooks_of(app: &App, agent: Entity) -> Vec<AgentHook> {
    app.world()
        .resource::<Events<AgentHook>>()
        .iter_current_update_events()
        .filter(|hook| hook.agent() == agent)
        .cloned()
        .collect()
}

fn state_of(app: &App, agent: Entity) -> AgentState {
    *app.world().get::<AgentState>(agent).unwrap()
}

/// Test: 4 burst'а по 3 выстрела из магазина на 10 → 10 выстрелов, 2 пропуска, Reloading
#[test]
fn test_engage_reload_cycle() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let trooper = spawn_agent(&mut app, "light_trooper", target);

    // Первый burst: ammo 10 → 7
    run_ticks(&mut app, 30);
    assert_eq!(state_of(&app, trooper), AgentState::Engage);
    assert_eq!(app.world().get::<Arsenal>(trooper).unwrap().pools[0].remaining, 7);

    run_ticks(&mut app, 240);

    let shots = shots_of(&app, trooper);
    let launched = shots
        .iter()
        .filter(|shot| shot.outcome == ShotOutcome::Launched)
        .count();
    let skipped = shots
        .iter()
        .filter(|shot| shot.outcome == ShotOutcome::Skipped)
        .count();
    assert_eq!(launched, 10);
    assert_eq!(skipped, 2);
    assert!(shots.iter().all(|shot| shot.attack == "rifle_burst"));

    assert_eq!(state_of(&app, trooper), AgentState::Reloading);
    assert_eq!(app.world().get::<Arsenal>(trooper).unwrap().pools[0].remaining, 0);

    let reloads = hooks_of(&app, trooper)
        .into_iter()
        .filter(|hook| matches!(hook, AgentHook::ReloadStarted { pool: 0, .. }))
        .count();
    assert_eq!(reloads, 1);
}

/// Test: конец reload с целью в радиусе → сразу Engage (без Chase)
#[test]
fn test_reload_completion_goes_straight_to_engage() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let trooper = spawn_agent(&mut app, "light_trooper", target);

    run_ticks(&mut app, 270);
    assert_eq!(state_of(&app, trooper), AgentState::Reloading);

    let mut ticks = 0;
    while state_of(&app, trooper) == AgentState::Reloading {
        run_ticks(&mut app, 1);
        ticks += 1;
        assert!(ticks < 180, "reload never completed");
    }

    assert_eq!(state_of(&app, trooper), AgentState::Engage);
    // Магазин полон, первый выстрел нового burst'а уходит следующим тиком
    assert_eq!(app.world().get::<Arsenal>(trooper).unwrap().pools[0].remaining, 10);
}

/// Test: цель дальше sight_range: агент не просыпается
#[test]
fn test_target_beyond_sight_range_stays_idle() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -20.0));
    let trooper = spawn_agent(&mut app, "light_trooper", target);

    run_ticks(&mut app, 120);

    assert_eq!(state_of(&app, trooper), AgentState::Idle);
    let perception = app.world().get::<Perception>(trooper).unwrap();
    assert!(!perception.visible);
    assert!((perception.distance - 20.0).abs() < 1e-4);
    assert!(shots_of(&app, trooper).is_empty());
}

/// Test: 50° от forward при half-angle 45°: не видно
#[test]
fn test_target_outside_view_cone_stays_idle() {
    let mut app = create_agent_app();
    let bearing = 50f32.to_radians();
    let target = spawn_target(
        &mut app,
        Vec3::new(5.0 * bearing.sin(), 0.0, -5.0 * bearing.cos()),
    );
    let trooper = spawn_agent(&mut app, "light_trooper", target);

    run_ticks(&mut app, 120);

    assert_eq!(state_of(&app, trooper), AgentState::Idle);
    assert!(!app.world().get::<Perception>(trooper).unwrap().visible);
    // Idle не доворачивается к цели
    let forward = app.world().get::<Transform>(trooper).unwrap().forward().as_vec3();
    assert!((forward - Vec3::NEG_Z).length() < 1e-5);
}

/// Test: стена между агентом и целью: не видно
#[test]
fn test_wall_blocks_perception() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 1.0, -5.0),
        Occluder::wall(Vec3::new(3.0, 2.0, 0.2)),
    ));
    let turret = spawn_agent(&mut app, "turret", target);

    run_ticks(&mut app, 120);

    assert_eq!(state_of(&app, turret), AgentState::Idle);
    assert!(shots_of(&app, turret).is_empty());
}

/// Test: без LineOfSightSource цель никогда не видна
#[test]
fn test_missing_line_of_sight_source_sees_nothing() {
    let mut app = create_agent_app();
    app.world_mut().remove_resource::<LineOfSightSource>();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));
    let trooper = spawn_agent(&mut app, "light_trooper", target);

    run_ticks(&mut app, 60);

    assert_eq!(state_of(&app, trooper), AgentState::Idle);
    assert!(shots_of(&app, trooper).is_empty());
}

/// Test: beam попадает пока видно, после появления стены: промахи
#[test]
fn test_beam_blocked_mid_burst_misses() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let turret = spawn_agent(&mut app, "turret", target);

    let mut ticks = 0;
    while shots_of(&app, turret).is_empty() {
        run_ticks(&mut app, 1);
        ticks += 1;
        assert!(ticks < 60, "turret never fired");
    }
    assert_eq!(shots_of(&app, turret)[0].outcome, ShotOutcome::Hit);

    app.world_mut().spawn((
        Transform::from_xyz(0.0, 1.0, -5.0),
        Occluder::wall(Vec3::new(3.0, 2.0, 0.2)),
    ));
    run_ticks(&mut app, 60);

    let shots = shots_of(&app, turret);
    assert_eq!(shots.len(), 5);
    assert!(shots[1..].iter().all(|shot| shot.outcome == ShotOutcome::Miss));

    // Урон только от первого луча
    run_ticks(&mut app, 1);
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 995);
}

/// Test: смерть после 2 из 5 выстрелов: остаток burst'а не стреляет, Dead навсегда
#[test]
fn test_death_mid_burst_cancels_schedule() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let turret = spawn_agent(&mut app, "turret", target);

    let mut ticks = 0;
    while shots_of(&app, turret).len() < 2 {
        run_ticks(&mut app, 1);
        ticks += 1;
        assert!(ticks < 60, "burst never started");
    }

    app.world_mut().send_event(DamageRequest {
        attacker: target,
        target: turret,
        amount: 10_000,
    });
    run_ticks(&mut app, 1);

    assert_eq!(state_of(&app, turret), AgentState::Dead);
    assert!(app
        .world()
        .get::<ScheduledActions>(turret)
        .unwrap()
        .iter()
        .all(|action| action.tag == ActionTag::Despawn));

    // Цель всё ещё видна и в радиусе: Dead не реагирует
    run_ticks(&mut app, 120);
    assert_eq!(state_of(&app, turret), AgentState::Dead);
    assert_eq!(shots_of(&app, turret).len(), 2);
    assert!(hooks_of(&app, turret)
        .iter()
        .any(|hook| matches!(hook, AgentHook::Died { .. })));

    // death_cleanup турели 4с
    run_ticks(&mut app, 180);
    assert!(app.world().get_entity(turret).is_err());
}

/// Test: в радиусе всех атак sentinel выбирает priority 1 (laser), потом summon
#[test]
fn test_sentinel_priority_and_summon() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -20.0));
    let sentinel = spawn_agent(&mut app, "sentinel", target);

    run_ticks(&mut app, 2);
    assert_eq!(state_of(&app, sentinel), AgentState::Charging);

    // Summon срабатывает на ~4.2с, chaser'ы ещё не добежали до цели
    run_ticks(&mut app, 298);

    let triggered: Vec<String> = hooks_of(&app, sentinel)
        .into_iter()
        .filter_map(|hook| match hook {
            AgentHook::AttackTriggered { attack, .. } => Some(attack),
            _ => None,
        })
        .collect();
    assert_eq!(triggered, vec!["laser".to_string(), "summon".to_string()]);

    // Laser попал один раз (дальше cooldown 8с)
    let laser_hits = shots_of(&app, sentinel)
        .iter()
        .filter(|shot| shot.attack == "laser" && shot.outcome == ShotOutcome::Hit)
        .count();
    assert_eq!(laser_hits, 1);
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 960);

    // 3 chaser'а призваны, охотятся на ту же цель
    let world = app.world_mut();
    let mut agents = world.query::<(&AgentArchetype, &TargetRef)>();
    let chasers: Vec<_> = agents
        .iter(world)
        .filter(|(archetype, _)| archetype.name == "chaser")
        .collect();
    assert_eq!(chasers.len(), 3);
    assert!(chasers
        .iter()
        .all(|(_, target_ref)| target_ref.0 == Some(target)));
}

/// Test: в очереди никогда нет выстрелов двух разных атак одновременно
#[test]
fn test_one_attack_in_flight() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));
    let sentinel = spawn_agent(&mut app, "sentinel", target);

    for _ in 0..900 {
        run_ticks(&mut app, 1);

        let Some(actions) = app.world().get::<ScheduledActions>(sentinel) else {
            break;
        };
        let in_flight: HashSet<usize> = actions
            .iter()
            .filter_map(|action| match action.tag {
                ActionTag::Fire { attack, .. } => Some(attack),
                _ => None,
            })
            .collect();
        assert!(in_flight.len() <= 1, "attacks overlap: {:?}", in_flight);
    }

    let triggered = hooks_of(&app, sentinel)
        .iter()
        .filter(|hook| matches!(hook, AgentHook::AttackTriggered { .. }))
        .count();
    assert!(triggered >= 2);
}

/// Test: цель умерла: агент теряет её и возвращается в Idle
#[test]
fn test_dead_target_is_lost() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let trooper = spawn_agent(&mut app, "light_trooper", target);

    run_ticks(&mut app, 10);
    assert_ne!(state_of(&app, trooper), AgentState::Idle);

    app.world_mut().get_mut::<Health>(target).unwrap().current = 0;
    // Дожидаемся конца текущего burst'а
    run_ticks(&mut app, 60);

    assert_eq!(state_of(&app, trooper), AgentState::Idle);
    assert!(!app.world().get::<Perception>(trooper).unwrap().has_target());
}

/// Test: цель ушла за sight_range × 1.5 посреди burst'а: Idle только после completion
#[test]
fn test_target_lost_while_busy_waits_for_completion() {
    let mut app = create_agent_app();
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let turret = spawn_agent(&mut app, "turret", target);

    let mut ticks = 0;
    while shots_of(&app, turret).is_empty() {
        run_ticks(&mut app, 1);
        ticks += 1;
        assert!(ticks < 60, "turret never fired");
    }

    // 500м: далеко за lost range турели (25 × 1.5)
    app.world_mut()
        .get_mut::<Transform>(target)
        .unwrap()
        .translation = Vec3::new(0.0, 0.0, -500.0);

    run_ticks(&mut app, 5);
    assert_eq!(state_of(&app, turret), AgentState::Engage);
    assert!(app.world().get::<Arsenal>(turret).unwrap().is_busy());
    assert!(app.world().get::<Perception>(turret).unwrap().distance > 37.5);

    // Burst (0.6с) + recovery (0.5с) ещё не закончились
    run_ticks(&mut app, 40);
    assert_eq!(state_of(&app, turret), AgentState::Engage);

    run_ticks(&mut app, 80);
    assert_eq!(state_of(&app, turret), AgentState::Idle);
    assert!(!app.world().get::<Arsenal>(turret).unwrap().is_busy());
    // Burst доигран до конца, новых атак нет
    assert_eq!(shots_of(&app, turret).len(), 5);
    let triggered = hooks_of(&app, turret)
        .iter()
        .filter(|hook| matches!(hook, AgentHook::AttackTriggered { .. }))
        .count();
    assert_eq!(triggered, 1);
}
