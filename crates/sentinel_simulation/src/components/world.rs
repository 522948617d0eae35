//! World компоненты: occlusion volumes для line-of-sight

use bevy::prelude::*;

/// Форма occlusion volume
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum OccluderShape {
    Sphere { radius: f32 },
    /// Axis-aligned box (вращение entity игнорируется)
    Box { half_extents: Vec3 },
}

/// Volume, блокирующий line of sight
///
/// Стены (static) и тела актёров (hurtbox). Raycast, первым попавший в volume
/// entity-цели, считается прямой видимостью.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Occluder {
    pub shape: OccluderShape,
    /// Смещение центра от `Transform::translation`
    pub offset: Vec3,
    /// Static геометрия (стены) vs тело актёра
    pub is_static: bool,
}

impl Occluder {
    /// Тело актёра: сфера на высоте груди
    pub fn body(radius: f32, height: f32) -> Self {
        Self {
            shape: OccluderShape::Sphere { radius },
            offset: Vec3::Y * height,
            is_static: false,
        }
    }

    /// Стена / препятствие
    pub fn wall(half_extents: Vec3) -> Self {
        Self {
            shape: OccluderShape::Box { half_extents },
            offset: Vec3::ZERO,
            is_static: true,
        }
    }
}
