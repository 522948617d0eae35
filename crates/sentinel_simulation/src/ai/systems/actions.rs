//! Queue drain: созревшие scheduled actions каждого агента.
//!
//! Fire steps превращаются в эффекты (beam / projectile / area / summon),
//! остальные теги двигают state machine. Действия, поставленные во время
//! drain (например первый выстрел атаки, выбранной после reload), ждут следующего тика.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ai::components::{AgentArchetype, AgentState, Perception, TargetRef};
use crate::ai::events::AgentHook;
use crate::ai::machine::{AgentContext, Directive};
use crate::ai::perception::{line_of_sight_hit, HitTag, LineOfSight, LineOfSightSource, Pose};
use crate::ai::systems::perception::collect_volumes;
use crate::clock::SimClock;
use crate::combat::{
    AreaBlast, Arsenal, AttackDefinition, AttackEffect, BeamFired, DamageRequest, PerceptionParams,
    ProjectileLaunched, ShotOutcome, ShotResolved, SpawnAgentRequest,
};
use crate::components::{Health, Occluder};
use crate::scheduler::ScheduledActions;
use crate::DeterministicRng;

/// Выходные события drain'а (effect spawner + hooks)
#[derive(SystemParam)]
pub struct EffectWriters<'w> {
    shots: EventWriter<'w, ShotResolved>,
    beams: EventWriter<'w, BeamFired>,
    projectiles: EventWriter<'w, ProjectileLaunched>,
    blasts: EventWriter<'w, AreaBlast>,
    damage: EventWriter<'w, DamageRequest>,
    spawns: EventWriter<'w, SpawnAgentRequest>,
    hooks: EventWriter<'w, AgentHook>,
}

/// Система: drain очередей всех агентов
pub fn drain_scheduled_actions(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    line_of_sight: Option<Res<LineOfSightSource>>,
    occluders: Query<(Entity, &Occluder, &Transform)>,
    targets: Query<(&Transform, Option<&Health>)>,
    mut agents: Query<(
        Entity,
        &AgentArchetype,
        &mut AgentState,
        &mut Arsenal,
        &mut ScheduledActions,
        &Perception,
        &TargetRef,
        &Transform,
    )>,
    mut out: EffectWriters,
) {
    let now = clock.elapsed_secs();
    let volumes = collect_volumes(&occluders);
    let mut hooks = Vec::new();

    for (entity, archetype, mut state, mut arsenal, mut actions, perception, target_ref, transform) in
        agents.iter_mut()
    {
        // Snapshot: всё, что поставлено во время drain, ждёт следующего тика
        let limit = actions.next_seq();
        let mut next_state = *state;
        let mut despawn = false;

        while let Some(action) = actions.pop_due(now, limit) {
            let directive = AgentContext {
                entity,
                archetype: &archetype.0,
                state: &mut next_state,
                arsenal: &mut arsenal,
                actions: &mut actions,
                perception,
                now,
                hooks: &mut hooks,
            }
            .resolve(action.tag);

            match directive {
                Directive::Nothing => {}
                Directive::Shoot {
                    attack,
                    shot,
                    loaded,
                } => {
                    let Some(definition) = archetype.attacks.get(attack) else {
                        continue;
                    };

                    let outcome = if loaded {
                        let target = target_ref.0.and_then(|target| {
                            targets
                                .get(target)
                                .ok()
                                .filter(|(_, health)| health.map_or(true, Health::is_alive))
                                .map(|(target_transform, _)| (target, Pose::from(target_transform)))
                        });
                        let resolved = line_of_sight
                            .as_deref()
                            .map(|source| source.resolve(&volumes, entity));

                        let shooter = Shooter {
                            entity,
                            pose: Pose::from(transform),
                            perception: &archetype.perception,
                            target,
                            summon_target: target_ref.0,
                        };
                        shooter.fire(definition, resolved.as_ref(), &mut rng.rng, &mut out)
                    } else {
                        crate::logger::log(&format!(
                            "🔫 {} {:?}: {} shot {} skipped (pool empty)",
                            archetype.name, entity, definition.id, shot
                        ));
                        ShotOutcome::Skipped
                    };

                    out.shots.write(ShotResolved {
                        agent: entity,
                        attack: definition.id.clone(),
                        shot,
                        outcome,
                    });
                }
                Directive::Despawn => {
                    despawn = true;
                    break;
                }
            }
        }

        state.set_if_neq(next_state);

        if despawn {
            crate::logger::log_info(&format!("🧹 {} {:?} despawned", archetype.name, entity));
            commands.entity(entity).despawn();
        }
    }

    for hook in hooks {
        out.hooks.write(hook);
    }
}

/// Стреляющий агент на момент fire step
struct Shooter<'a> {
    entity: Entity,
    pose: Pose,
    perception: &'a PerceptionParams,
    /// Живая цель и её поза (None = stale)
    target: Option<(Entity, Pose)>,
    /// Цель для призванных миньонов
    summon_target: Option<Entity>,
}

impl Shooter<'_> {
    fn fire(
        &self,
        attack: &AttackDefinition,
        line_of_sight: Option<&LineOfSight>,
        rng: &mut ChaCha8Rng,
        out: &mut EffectWriters,
    ) -> ShotOutcome {
        match &attack.effect {
            AttackEffect::Beam { damage } => self.fire_beam(attack, *damage, line_of_sight, out),
            AttackEffect::Projectile {
                damage,
                speed,
                spread,
            } => self.launch_projectile(*damage, *speed, *spread, rng, out),
            AttackEffect::Area { damage, radius } => self.blast(*damage, *radius, out),
            AttackEffect::Summon {
                archetype,
                count,
                radius,
            } => self.summon(archetype, *count, *radius, rng, out),
        }
    }

    fn fire_beam(
        &self,
        attack: &AttackDefinition,
        damage: u32,
        line_of_sight: Option<&LineOfSight>,
        out: &mut EffectWriters,
    ) -> ShotOutcome {
        let Some((target, target_pose)) = self.target else {
            return ShotOutcome::Miss;
        };

        let eye_height = self.perception.eye_height;
        let origin = self.pose.eye(eye_height);
        let aim = target_pose.eye(eye_height);

        let hit = line_of_sight
            .and_then(|los| line_of_sight_hit(&self.pose, &target_pose, eye_height, los.probe()))
            == Some(HitTag::Entity(target));

        let end = if hit {
            aim
        } else {
            let direction = (aim - origin).try_normalize().unwrap_or(self.pose.forward);
            origin + direction * attack.activation_range
        };

        out.beams.write(BeamFired {
            shooter: self.entity,
            origin,
            end,
            hit: hit.then_some(target),
            damage,
        });

        if hit {
            out.damage.write(DamageRequest {
                attacker: self.entity,
                target,
                amount: damage,
            });
            ShotOutcome::Hit
        } else {
            ShotOutcome::Miss
        }
    }

    fn launch_projectile(
        &self,
        damage: u32,
        speed: f32,
        spread: f32,
        rng: &mut ChaCha8Rng,
        out: &mut EffectWriters,
    ) -> ShotOutcome {
        let Some((target, target_pose)) = self.target else {
            return ShotOutcome::Miss;
        };

        let eye_height = self.perception.eye_height;
        let origin = self.pose.eye(eye_height);
        let aim = (target_pose.eye(eye_height) - origin)
            .try_normalize()
            .unwrap_or(self.pose.forward);

        let direction = if spread > 0.0 {
            let yaw = rng.gen_range(-spread..=spread);
            let pitch = rng.gen_range(-spread..=spread);
            let right = aim.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
            (Quat::from_rotation_y(yaw) * Quat::from_axis_angle(right, pitch) * aim).normalize()
        } else {
            aim
        };

        out.projectiles.write(ProjectileLaunched {
            shooter: self.entity,
            target: Some(target),
            origin,
            direction,
            speed,
            damage,
        });
        ShotOutcome::Launched
    }

    fn blast(&self, damage: u32, radius: f32, out: &mut EffectWriters) -> ShotOutcome {
        let hit = self
            .target
            .filter(|(_, pose)| pose.position.distance(self.pose.position) <= radius)
            .map(|(target, _)| target);

        out.blasts.write(AreaBlast {
            source: self.entity,
            center: self.pose.position,
            radius,
            damage,
            hit,
        });

        match hit {
            Some(target) => {
                out.damage.write(DamageRequest {
                    attacker: self.entity,
                    target,
                    amount: damage,
                });
                ShotOutcome::Hit
            }
            None => ShotOutcome::Miss,
        }
    }

    fn summon(
        &self,
        archetype: &str,
        count: u32,
        radius: f32,
        rng: &mut ChaCha8Rng,
        out: &mut EffectWriters,
    ) -> ShotOutcome {
        for _ in 0..count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            // sqrt → равномерно по площади диска
            let distance = radius.max(0.0) * rng.gen::<f32>().sqrt();
            let offset = Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

            out.spawns.write(SpawnAgentRequest {
                archetype: archetype.to_string(),
                position: self.pose.position + offset,
                target: self.summon_target,
                summoner: Some(self.entity),
            });
        }

        crate::logger::log_info(&format!(
            "👾 {:?} summons {} × {}",
            self.entity, count, archetype
        ));
        ShotOutcome::Summoned
    }
}
