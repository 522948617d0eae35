//! Perception Query: чистые функции видимости.
//!
//! Порядок проверок (дешёвые первыми):
//! 1. distance > sight_range → не видно
//! 2. угол forward ↔ (agent → target) > view_half_angle → не видно
//! 3. raycast от глаз к цели: видно, если первый hit: сама цель
//!
//! Без retries и hysteresis: видимость пересчитывается каждый тик.
//! Occlusion: внешняя capability (`OcclusionProbe`): navmesh/physics хоста
//! или встроенный `VolumeProbe` по `Occluder` компонентам.

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::math::{Dir3A, Vec3A};
use bevy::prelude::*;

use crate::combat::PerceptionParams;
use crate::components::{Occluder, OccluderShape};

/// Дистанция, ниже которой угол не проверяется (цель "в упор")
const ANGLE_EPSILON: f32 = 1e-4;

/// Запас дальности raycast за точкой прицела
const RAY_SLACK: f32 = 0.5;

/// Поза (позиция + forward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or_zero(),
        }
    }

    /// Точка глаз (pivot + eye_height по Y)
    pub fn eye(&self, eye_height: f32) -> Vec3 {
        self.position + Vec3::Y * eye_height
    }
}

impl From<&Transform> for Pose {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
        }
    }
}

/// Что первым пересёк raycast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTag {
    Entity(Entity),
    /// Геометрия уровня без entity
    Static,
}

/// Occlusion capability (consumed)
pub trait OcclusionProbe: Send + Sync {
    /// `direction` нормализован. None = ничего до `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<HitTag>;
}

/// Probe из замыкания (тесты, простые хосты)
pub struct FnProbe<F>(pub F);

impl<F> OcclusionProbe for FnProbe<F>
where
    F: Fn(Vec3, Vec3, f32) -> Option<HitTag> + Send + Sync,
{
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<HitTag> {
        (self.0)(origin, direction, max_distance)
    }
}

pub fn distance(agent: &Pose, target: &Pose) -> f32 {
    agent.position.distance(target.position)
}

/// Видна ли цель агенту в этом тике
///
/// `probe == None` (нет occlusion collaborator'а) → никогда не видно.
pub fn is_visible(
    agent: &Pose,
    target: &Pose,
    params: &PerceptionParams,
    probe: Option<&dyn OcclusionProbe>,
    target_entity: Entity,
) -> bool {
    let dist = distance(agent, target);
    if dist > params.sight_range {
        return false;
    }

    let to_target = target.position - agent.position;
    if to_target.length() > ANGLE_EPSILON && agent.forward != Vec3::ZERO {
        if agent.forward.angle_between(to_target) > params.view_half_angle {
            return false;
        }
    }

    let Some(probe) = probe else {
        return false;
    };

    line_of_sight_hit(agent, target, params.eye_height, probe)
        .map(|hit| hit == HitTag::Entity(target_entity))
        .unwrap_or(false)
}

/// Raycast от глаз агента к глазам цели. Общий для perception и beam атак.
pub fn line_of_sight_hit(
    agent: &Pose,
    target: &Pose,
    eye_height: f32,
    probe: &dyn OcclusionProbe,
) -> Option<HitTag> {
    let origin = agent.eye(eye_height);
    let aim = target.eye(eye_height);
    let offset = aim - origin;
    let length = offset.length();
    if length <= ANGLE_EPSILON {
        // Глаза совпадают: raycast вырожден, считаем прямой контакт
        return probe.raycast(origin, Vec3::Y, RAY_SLACK);
    }
    probe.raycast(origin, offset / length, length + RAY_SLACK)
}

/// Occluder в мировых координатах (snapshot за тик)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    pub entity: Entity,
    pub shape: OccluderShape,
    pub center: Vec3,
    pub is_static: bool,
}

impl Volume {
    pub fn from_occluder(entity: Entity, occluder: &Occluder, transform: &Transform) -> Self {
        Self {
            entity,
            shape: occluder.shape,
            center: transform.translation + occluder.offset,
            is_static: occluder.is_static,
        }
    }

    /// Дистанция вдоль луча до входа в volume (0 если origin внутри)
    pub fn ray_entry(&self, ray: &RayCast3d) -> Option<f32> {
        let center = Vec3A::from(self.center);
        match self.shape {
            OccluderShape::Sphere { radius } => {
                ray.sphere_intersection_at(&BoundingSphere::new(center, radius))
            }
            OccluderShape::Box { half_extents } => {
                ray.aabb_intersection_at(&Aabb3d::new(center, Vec3A::from(half_extents)))
            }
        }
    }
}

/// Встроенный probe по snapshot'у `Occluder` volumes
pub struct VolumeProbe<'a> {
    volumes: &'a [Volume],
    ignore: Option<Entity>,
}

impl<'a> VolumeProbe<'a> {
    pub fn new(volumes: &'a [Volume]) -> Self {
        Self {
            volumes,
            ignore: None,
        }
    }

    /// Не учитывать собственное тело агента
    pub fn ignoring(mut self, entity: Entity) -> Self {
        self.ignore = Some(entity);
        self
    }
}

impl OcclusionProbe for VolumeProbe<'_> {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<HitTag> {
        let direction = Dir3A::new(Vec3A::from(direction)).ok()?;
        let ray = RayCast3d::new(Vec3A::from(origin), direction, max_distance);

        self.volumes
            .iter()
            .filter(|v| Some(v.entity) != self.ignore)
            .filter_map(|v| v.ray_entry(&ray).map(|t| (t, v)))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, v)| {
                if v.is_static {
                    HitTag::Static
                } else {
                    HitTag::Entity(v.entity)
                }
            })
    }
}

/// Откуда берётся occlusion (вставляется при сборке app)
///
/// Отсутствие ресурса = нет collaborator'а: perception деградирует
/// в "никогда не видно" с одним warning'ом.
#[derive(Resource)]
pub enum LineOfSightSource {
    /// Встроенный `VolumeProbe` по `Occluder` компонентам
    Volumes,
    /// Probe хоста (physics raycast)
    External(Box<dyn OcclusionProbe>),
}

impl LineOfSightSource {
    pub fn resolve<'a>(&'a self, volumes: &'a [Volume], agent: Entity) -> LineOfSight<'a> {
        match self {
            LineOfSightSource::Volumes => LineOfSight::Volumes(VolumeProbe::new(volumes).ignoring(agent)),
            LineOfSightSource::External(probe) => LineOfSight::External(probe.as_ref()),
        }
    }
}

/// Probe конкретного агента на этот тик
pub enum LineOfSight<'a> {
    Volumes(VolumeProbe<'a>),
    External(&'a dyn OcclusionProbe),
}

impl LineOfSight<'_> {
    pub fn probe(&self) -> &dyn OcclusionProbe {
        match self {
            LineOfSight::Volumes(probe) => probe,
            LineOfSight::External(probe) => *probe,
        }
    }
}
