/*!
Ray-shape intersection tests.

Rays are tested against bodies by a linear scan in the world; there is no
spatial acceleration for rays. Spheres use closest-point projection onto the
ray with the exact surface-hit distance; boxes use the slab method against
their axis-aligned extents.
*/

use crate::body::Body;
use crate::types::{Ray, Shape, Vec3};

/// A single ray-shape intersection.
#[derive(Copy, Clone, Debug)]
pub struct RayHit {
    /// Distance from the ray origin to the surface hit point.
    pub distance: f32,
    /// World-space hit point on the surface.
    pub point: Vec3,
    /// Outward surface normal at the hit point.
    pub normal: Vec3,
}

/// Test a ray against a body's shape. Unsupported shapes never hit.
///
/// Only hits in front of the origin are reported; a ray starting inside a
/// shape misses it.
pub fn ray_shape(body: &Body, ray: &Ray) -> Option<RayHit> {
    match body.shape {
        Shape::Sphere { radius } => ray_sphere(body.position, radius, ray),
        Shape::Box { extents } => ray_box(body.position, extents, ray),
        _ => None,
    }
}

/// Ray against a sphere via closest-point projection.
pub fn ray_sphere(center: Vec3, radius: f32, ray: &Ray) -> Option<RayHit> {
    let to_center = center - ray.origin;
    let t_closest = to_center.dot(&ray.direction);
    let closest = ray.origin + ray.direction * t_closest;
    let offset_sq = (center - closest).norm_squared();
    let radius_sq = radius * radius;
    if offset_sq > radius_sq {
        return None;
    }

    // Back up from the closest approach to the entry point on the surface.
    let half_chord = (radius_sq - offset_sq).sqrt();
    let distance = t_closest - half_chord;
    if distance < 0.0 {
        return None;
    }

    let point = ray.origin + ray.direction * distance;
    Some(RayHit {
        distance,
        point,
        normal: (point - center) / radius,
    })
}

/// Ray against an axis-aligned box via the slab method.
pub fn ray_box(center: Vec3, extents: Vec3, ray: &Ray) -> Option<RayHit> {
    let box_min = center - extents * 0.5;
    let box_max = center + extents * 0.5;

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_axis = 0;

    for axis in 0..3 {
        let inv = 1.0 / ray.direction[axis];
        let mut t1 = (box_min[axis] - ray.origin[axis]) * inv;
        let mut t2 = (box_max[axis] - ray.origin[axis]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_near {
            t_near = t1;
            near_axis = axis;
        }
        t_far = t_far.min(t2);
        if t_near > t_far {
            return None;
        }
    }

    if t_near < 0.0 {
        return None;
    }

    // Face normal on the entry axis, oriented against the ray.
    let mut normal = Vec3::zeros();
    normal[near_axis] = if ray.direction[near_axis] > 0.0 {
        -1.0
    } else {
        1.0
    };

    Some(RayHit {
        distance: t_near,
        point: ray.origin + ray.direction * t_near,
        normal,
    })
}
