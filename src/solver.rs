/*!
Impulse-based contact resolution.

The solver runs a single sequential-impulse pass per contact per sub-step:
normal impulse with restitution, Coulomb friction clamped by the normal
impulse, then a Baumgarte-style positional correction that bleeds off
residual penetration. An iteration-count parameter exists on the world for
future tuning but the current design is deliberately single-pass.
*/

use crate::body::Body;
use crate::narrow::Contact;
use crate::settings::{CORRECTION_PERCENT, FRICTION_MIN_SPEED, PENETRATION_SLOP};
use crate::types::BodyKind;

/// Inverse mass as seen by the solver. Static and kinematic bodies are
/// immovable by contacts regardless of their stored mass.
#[inline]
fn effective_inverse_mass(body: &Body) -> f32 {
    match body.kind {
        BodyKind::Dynamic => body.inverse_mass,
        BodyKind::Static | BodyKind::Kinematic => 0.0,
    }
}

/// Resolve a single contact between two bodies.
///
/// Order of operations: separating check, normal impulse, friction,
/// positional correction, wake.
pub fn resolve_contact(a: &mut Body, b: &mut Body, contact: &Contact) {
    if !a.awake && !b.awake {
        return;
    }

    let inv_a = effective_inverse_mass(a);
    let inv_b = effective_inverse_mass(b);
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        // Two immovable bodies; nothing to resolve.
        return;
    }

    let normal = contact.normal;
    let relative_velocity = b.velocity - a.velocity;
    let velocity_along_normal = relative_velocity.dot(&normal);

    // Already separating; leave the pair alone.
    if velocity_along_normal >= 0.0 {
        return;
    }

    // Normal impulse with restitution.
    let j = -(1.0 + contact.restitution) * velocity_along_normal / inv_sum;
    let impulse = normal * j;
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;

    apply_friction(a, b, contact, inv_a, inv_b, j);

    // Positional correction: remove penetration beyond the slop, scaled by
    // the correction percentage and distributed by inverse mass.
    let correction_magnitude =
        (contact.penetration - PENETRATION_SLOP).max(0.0) / inv_sum * CORRECTION_PERCENT;
    let correction = normal * correction_magnitude;
    a.position -= correction * inv_a;
    b.position += correction * inv_b;

    // Mark both as active without resetting sleep timers: a resting contact
    // must still be allowed to drift to sleep.
    a.awake = true;
    b.awake = true;
}

/// Coulomb friction along the contact tangent, clamped to mu * |j|.
fn apply_friction(a: &mut Body, b: &mut Body, contact: &Contact, inv_a: f32, inv_b: f32, j: f32) {
    // Recompute relative velocity after the normal impulse.
    let relative_velocity = b.velocity - a.velocity;
    let normal = contact.normal;
    let tangent_velocity = relative_velocity - normal * relative_velocity.dot(&normal);
    let tangent_speed = tangent_velocity.norm();
    if tangent_speed <= FRICTION_MIN_SPEED {
        return;
    }

    let tangent = tangent_velocity / tangent_speed;
    let jt = -relative_velocity.dot(&tangent) / (inv_a + inv_b);
    let max_friction = contact.friction * j.abs();
    let jt = jt.clamp(-max_friction, max_friction);

    let friction_impulse = tangent * jt;
    a.velocity -= friction_impulse * inv_a;
    b.velocity += friction_impulse * inv_b;
}
