/*!
Core math aliases and data types shared by the physics submodules.

This module intentionally contains no algorithms. It defines the data
exchanged between:
- body (rigid body state and materials)
- spatial (uniform-grid broad phase)
- narrow (shape-pair narrow phase)
- solver (impulse-based contact resolution)
- world (step orchestration and queries)
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Mat3 = na::Matrix3<f32>;

/// Bit mask used to filter raycasts and overlap queries by body layer.
pub type LayerMask = u32;

/// Mask that matches every layer.
pub const LAYER_ALL: LayerMask = u32::MAX;

/// Kinematic class of a body.
///
/// - Static: never moves, infinite mass (ground, walls).
/// - Dynamic: fully simulated (players, debris, pickups).
/// - Kinematic: externally driven; integrates its set velocity but receives
///   no forces and never sleeps (moving platforms).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
    Kinematic,
}

/// Collision shape of a body, with its dimensions in local space.
///
/// Only `Sphere` and `Box` have narrow-phase support. The remaining tags are
/// declared so gameplay code can label bodies ahead of time; they produce no
/// contacts and fall back to a unit bounding radius.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere {
        /// Radius in meters.
        radius: f32,
    },
    Box {
        /// Full extents (width, height, depth) in meters.
        extents: Vec3,
    },
    Capsule {
        radius: f32,
        half_height: f32,
    },
    Cylinder {
        radius: f32,
        half_height: f32,
    },
    Mesh,
    Plane,
}

impl Shape {
    /// Radius of the bounding sphere used by the broad phase and the
    /// spatial grid.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => radius,
            Shape::Box { extents } => extents.norm() * 0.5,
            Shape::Capsule {
                radius,
                half_height,
            }
            | Shape::Cylinder {
                radius,
                half_height,
            } => radius + half_height,
            Shape::Mesh | Shape::Plane => 1.0,
        }
    }
}

/// Stable reference to a body owned by a `PhysicsWorld`.
///
/// Handles are generational: destroying a body bumps its slot's generation,
/// so a handle held past `destroy_body` resolves to `None` instead of
/// aliasing whichever body later reuses the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl BodyHandle {
    /// Slot index inside the world's body arena. Only meaningful for
    /// debugging; do not persist.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// A raycast query: origin, direction, and maximum distance.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction. Constructed via [`Ray::new`], which normalizes;
    /// a zero-length input stays zero and the ray hits nothing.
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Build a ray, normalizing `direction`. A zero-length direction is kept
    /// as zero; such a ray misses everything rather than panicking.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        let norm = direction.norm();
        let direction = if norm > 0.0 {
            direction / norm
        } else {
            Vec3::zeros()
        };
        Self {
            origin,
            direction,
            max_distance,
        }
    }
}

/// Result of a raycast query.
#[derive(Copy, Clone, Debug)]
pub struct RaycastResult {
    pub hit: bool,
    /// World-space hit point on the surface.
    pub point: Vec3,
    /// Outward surface normal at the hit point.
    pub normal: Vec3,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// The body that was hit, `None` on a miss.
    pub body: Option<BodyHandle>,
}

impl Default for RaycastResult {
    fn default() -> Self {
        Self {
            hit: false,
            point: Vec3::zeros(),
            normal: Vec3::zeros(),
            distance: 0.0,
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_bounding_radius_is_its_radius() {
        let s = Shape::Sphere { radius: 2.5 };
        assert_relative_eq!(s.bounding_radius(), 2.5);
    }

    #[test]
    fn box_bounding_radius_is_half_diagonal() {
        // A 2x2x2 box has a diagonal of 2*sqrt(3), so half is sqrt(3).
        let b = Shape::Box {
            extents: Vec3::new(2.0, 2.0, 2.0),
        };
        assert_relative_eq!(b.bounding_radius(), 3.0_f32.sqrt(), epsilon = 1.0e-6);
    }

    #[test]
    fn unsupported_shapes_fall_back_to_unit_radius() {
        assert_relative_eq!(Shape::Mesh.bounding_radius(), 1.0);
        assert_relative_eq!(Shape::Plane.bounding_radius(), 1.0);
    }

    #[test]
    fn ray_new_normalizes_direction() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -10.0), 100.0);
        assert_relative_eq!(ray.direction.norm(), 1.0, epsilon = 1.0e-6);
        assert_relative_eq!(ray.direction.z, -1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn zero_direction_ray_stays_zero() {
        let ray = Ray::new(Vec3::zeros(), Vec3::zeros(), 100.0);
        assert_relative_eq!(ray.direction.norm(), 0.0);
    }
}
