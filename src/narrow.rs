/*!
Narrow-phase collision tests and the contact manifold they produce.

Dispatch is an exhaustive match over shape-pair tags rather than trait
objects: adding a shape is a compile-time-checked change and there is no
virtual dispatch on the hot path. Supported pairs are sphere-sphere, box-box
(axis-aligned), and sphere-box; everything else yields no contact.

Contacts are ephemeral. They are produced during a step's broad phase,
consumed by the solver within the same step, and cleared before the step
returns. They hold arena indices, never references.
*/

use crate::body::Body;
use crate::types::{Shape, Vec3};

/// A transient collision manifold between two bodies, valid for one step.
#[derive(Copy, Clone, Debug)]
pub struct Contact {
    /// Arena index of the first body.
    pub a: usize,
    /// Arena index of the second body.
    pub b: usize,
    /// World-space contact point.
    pub point: Vec3,
    /// Unit contact normal, pointing from body `a` toward body `b`.
    pub normal: Vec3,
    /// Overlap depth along the normal (meters, positive).
    pub penetration: f32,
    /// Velocity of `b` relative to `a` at detection time.
    pub relative_velocity: Vec3,
    /// Combined restitution: the minimum of the two materials.
    pub restitution: f32,
    /// Combined friction: the minimum of the two materials.
    pub friction: f32,
}

/// Test a candidate pair and produce a contact manifold on overlap.
///
/// `index_a`/`index_b` are recorded into the contact so the solver can look
/// the bodies back up in the arena.
pub fn collide(index_a: usize, index_b: usize, a: &Body, b: &Body) -> Option<Contact> {
    match (a.shape, b.shape) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(index_a, index_b, a, b, ra, rb)
        }
        (Shape::Box { extents: ea }, Shape::Box { extents: eb }) => {
            box_box(index_a, index_b, a, b, ea, eb)
        }
        (Shape::Sphere { radius }, Shape::Box { extents }) => {
            sphere_box(index_a, index_b, a, b, radius, extents, false)
        }
        (Shape::Box { extents }, Shape::Sphere { radius }) => {
            // Run the test with sphere/box roles swapped, then flip the
            // normal back so it still points from `a` toward `b`.
            sphere_box(index_a, index_b, b, a, radius, extents, true)
        }
        _ => convex_convex(index_a, index_b, a, b),
    }
}

/// Placeholder for general convex pairs (capsule, cylinder, mesh).
///
/// A GJK/EPA path would slot in here; it is deliberately out of scope, so
/// unsupported pairs simply produce no contact.
fn convex_convex(_index_a: usize, _index_b: usize, _a: &Body, _b: &Body) -> Option<Contact> {
    None
}

fn sphere_sphere(
    index_a: usize,
    index_b: usize,
    a: &Body,
    b: &Body,
    ra: f32,
    rb: f32,
) -> Option<Contact> {
    let delta = b.position - a.position;
    let distance = delta.norm();
    let radius_sum = ra + rb;

    // Coincident centers have no usable normal; skip contact generation
    // rather than fabricate a direction.
    if distance <= 0.0 || distance >= radius_sum {
        return None;
    }

    let normal = delta / distance;
    Some(Contact {
        a: index_a,
        b: index_b,
        point: a.position + normal * ra,
        normal,
        penetration: radius_sum - distance,
        relative_velocity: b.velocity - a.velocity,
        restitution: a.material.restitution.min(b.material.restitution),
        friction: a.material.friction.min(b.material.friction),
    })
}

/// Axis-aligned box pair. Overlap is tested per axis; the axis with the
/// minimum overlap is taken as the separating axis (least-penetration
/// heuristic) and the normal is oriented from `a` toward `b` along it.
fn box_box(
    index_a: usize,
    index_b: usize,
    a: &Body,
    b: &Body,
    extents_a: Vec3,
    extents_b: Vec3,
) -> Option<Contact> {
    let a_min = a.position - extents_a * 0.5;
    let a_max = a.position + extents_a * 0.5;
    let b_min = b.position - extents_b * 0.5;
    let b_max = b.position + extents_b * 0.5;

    if a_max.x <= b_min.x
        || a_min.x >= b_max.x
        || a_max.y <= b_min.y
        || a_min.y >= b_max.y
        || a_max.z <= b_min.z
        || a_min.z >= b_max.z
    {
        return None;
    }

    let overlap = Vec3::new(
        a_max.x.min(b_max.x) - a_min.x.max(b_min.x),
        a_max.y.min(b_max.y) - a_min.y.max(b_min.y),
        a_max.z.min(b_max.z) - a_min.z.max(b_min.z),
    );

    let (normal, penetration) = if overlap.x < overlap.y && overlap.x < overlap.z {
        let sign = if a.position.x < b.position.x { 1.0 } else { -1.0 };
        (Vec3::new(sign, 0.0, 0.0), overlap.x)
    } else if overlap.y < overlap.z {
        let sign = if a.position.y < b.position.y { 1.0 } else { -1.0 };
        (Vec3::new(0.0, sign, 0.0), overlap.y)
    } else {
        let sign = if a.position.z < b.position.z { 1.0 } else { -1.0 };
        (Vec3::new(0.0, 0.0, sign), overlap.z)
    };

    Some(Contact {
        a: index_a,
        b: index_b,
        point: a.position,
        normal,
        penetration,
        relative_velocity: b.velocity - a.velocity,
        restitution: a.material.restitution.min(b.material.restitution),
        friction: a.material.friction.min(b.material.friction),
    })
}

/// Sphere against axis-aligned box: clamp the sphere center into the box to
/// find the nearest box point, then compare against the radius.
///
/// `flipped` is true when the caller's first body is the box; the normal is
/// negated in that case so it always points from `a` toward `b`.
fn sphere_box(
    index_a: usize,
    index_b: usize,
    sphere: &Body,
    boxy: &Body,
    radius: f32,
    extents: Vec3,
    flipped: bool,
) -> Option<Contact> {
    let box_min = boxy.position - extents * 0.5;
    let box_max = boxy.position + extents * 0.5;

    let closest = Vec3::new(
        sphere.position.x.clamp(box_min.x, box_max.x),
        sphere.position.y.clamp(box_min.y, box_max.y),
        sphere.position.z.clamp(box_min.z, box_max.z),
    );

    let delta = sphere.position - closest;
    let distance = delta.norm();
    if distance >= radius {
        return None;
    }

    // Normal from the box surface toward the sphere center. If the center
    // is inside the box the delta is zero; push out along the axis of least
    // exit distance instead.
    let mut normal = if distance > 0.0 {
        delta / distance
    } else {
        least_exit_axis(sphere.position, box_min, box_max)
    };
    let penetration = radius - distance;

    // `normal` currently points box -> sphere. The contact records a -> b.
    if !flipped {
        // a is the sphere, so a -> b is sphere -> box.
        normal = -normal;
    }

    let (body_a, body_b) = if flipped { (boxy, sphere) } else { (sphere, boxy) };
    Some(Contact {
        a: index_a,
        b: index_b,
        point: closest,
        normal,
        penetration,
        relative_velocity: body_b.velocity - body_a.velocity,
        restitution: sphere.material.restitution.min(boxy.material.restitution),
        friction: sphere.material.friction.min(boxy.material.friction),
    })
}

/// Outward axis along which a point inside a box exits soonest.
fn least_exit_axis(point: Vec3, box_min: Vec3, box_max: Vec3) -> Vec3 {
    let exits = [
        (point.x - box_min.x, Vec3::new(-1.0, 0.0, 0.0)),
        (box_max.x - point.x, Vec3::new(1.0, 0.0, 0.0)),
        (point.y - box_min.y, Vec3::new(0.0, -1.0, 0.0)),
        (box_max.y - point.y, Vec3::new(0.0, 1.0, 0.0)),
        (point.z - box_min.z, Vec3::new(0.0, 0.0, -1.0)),
        (box_max.z - point.z, Vec3::new(0.0, 0.0, 1.0)),
    ];
    exits
        .iter()
        .min_by(|(da, _), (db, _)| da.total_cmp(db))
        .map(|&(_, axis)| axis)
        .unwrap_or(Vec3::new(0.0, 1.0, 0.0))
}
