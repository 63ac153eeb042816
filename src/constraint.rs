/*!
Distance constraints between body pairs.

A constraint tries to keep two body centers at the rest distance captured
when it was added (rope segments, simple joints). The solve is iterative and
position-based: each pass moves the pair toward the rest distance by the
constraint's stiffness, distributed by inverse mass, and removes a fraction
of the relative velocity along the constraint axis so the pair settles
instead of oscillating.
*/

use crate::settings::DIST_EPS;
use crate::types::{BodyHandle, BodyKind, Vec3};
use crate::world::PhysicsWorld;

struct DistanceConstraint {
    a: BodyHandle,
    b: BodyHandle,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
}

/// Iterative solver for distance constraints.
pub struct ConstraintSolver {
    constraints: Vec<DistanceConstraint>,
    iterations: u32,
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ConstraintSolver {
    pub fn new(iterations: u32) -> Self {
        Self {
            constraints: Vec::new(),
            iterations,
        }
    }

    #[inline]
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
    }

    /// Link two bodies at their current center distance.
    pub fn add(&mut self, world: &PhysicsWorld, a: BodyHandle, b: BodyHandle, stiffness: f32) {
        let (Some(body_a), Some(body_b)) = (world.body(a), world.body(b)) else {
            return;
        };
        self.constraints.push(DistanceConstraint {
            a,
            b,
            rest_length: (body_b.position - body_a.position).norm(),
            stiffness,
            damping: 0.1,
        });
    }

    /// Remove every constraint linking the two bodies, in either order.
    pub fn remove_between(&mut self, a: BodyHandle, b: BodyHandle) {
        self.constraints
            .retain(|c| !(c.a == a && c.b == b) && !(c.a == b && c.b == a));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Run the iterative solve. Call once per frame after
    /// `PhysicsWorld::step`. Constraints whose bodies were destroyed are
    /// dropped.
    pub fn solve(&mut self, world: &mut PhysicsWorld) {
        self.constraints
            .retain(|c| world.body(c.a).is_some() && world.body(c.b).is_some());

        for _ in 0..self.iterations {
            for constraint in &self.constraints {
                solve_distance(world, constraint);
            }
        }
    }
}

fn solve_distance(world: &mut PhysicsWorld, constraint: &DistanceConstraint) {
    let (Some(a), Some(b)) = (world.body(constraint.a), world.body(constraint.b)) else {
        return;
    };

    let inv_a = if a.kind == BodyKind::Dynamic { a.inverse_mass } else { 0.0 };
    let inv_b = if b.kind == BodyKind::Dynamic { b.inverse_mass } else { 0.0 };
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }

    let delta = b.position - a.position;
    let distance = delta.norm();
    if distance <= DIST_EPS {
        return;
    }
    let axis = delta / distance;
    let error = distance - constraint.rest_length;

    // Positional pull toward the rest length.
    let correction = axis * (error * constraint.stiffness / inv_sum);
    // Velocity damping along the axis.
    let closing_speed = (b.velocity - a.velocity).dot(&axis);
    let damping_impulse = axis * (closing_speed * constraint.damping / inv_sum);

    if let Some(body) = world.body_mut(constraint.a) {
        body.position += correction * inv_a;
        body.velocity += damping_impulse * inv_a;
    }
    if let Some(body) = world.body_mut(constraint.b) {
        body.position -= correction * inv_b;
        body.velocity -= damping_impulse * inv_b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;
    use approx::assert_relative_eq;

    fn add_sphere(world: &mut PhysicsWorld, position: Vec3) -> BodyHandle {
        let handle = world.create_body(BodyKind::Dynamic);
        let body = world.body_mut(handle).unwrap();
        body.position = position;
        body.shape = Shape::Sphere { radius: 0.1 };
        handle
    }

    fn quiet_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec3::zeros());
        world.set_air_density(0.0);
        world
    }

    #[test]
    fn constraint_restores_rest_distance() {
        let mut world = quiet_world();
        let a = add_sphere(&mut world, Vec3::zeros());
        let b = add_sphere(&mut world, Vec3::new(2.0, 0.0, 0.0));

        let mut solver = ConstraintSolver::new(10);
        solver.add(&world, a, b, 0.5);

        // Stretch the pair, then let the solver pull them back.
        world.body_mut(b).unwrap().position = Vec3::new(4.0, 0.0, 0.0);
        for _ in 0..50 {
            solver.solve(&mut world);
        }

        let pa = world.body(a).unwrap().position;
        let pb = world.body(b).unwrap().position;
        assert_relative_eq!((pb - pa).norm(), 2.0, epsilon = 1.0e-2);
    }

    #[test]
    fn correction_is_distributed_by_inverse_mass() {
        let mut world = quiet_world();
        let heavy = add_sphere(&mut world, Vec3::zeros());
        let light = add_sphere(&mut world, Vec3::new(2.0, 0.0, 0.0));
        world.body_mut(heavy).unwrap().set_mass(100.0);
        world.body_mut(light).unwrap().set_mass(1.0);

        let mut solver = ConstraintSolver::new(10);
        solver.add(&world, heavy, light, 0.5);

        world.body_mut(light).unwrap().position = Vec3::new(4.0, 0.0, 0.0);
        solver.solve(&mut world);

        // The light body moves much farther than the heavy one.
        let heavy_moved = world.body(heavy).unwrap().position.norm();
        let light_moved = (world.body(light).unwrap().position - Vec3::new(4.0, 0.0, 0.0)).norm();
        assert!(light_moved > heavy_moved * 10.0);
    }

    #[test]
    fn remove_between_matches_either_order() {
        let mut world = quiet_world();
        let a = add_sphere(&mut world, Vec3::zeros());
        let b = add_sphere(&mut world, Vec3::new(1.0, 0.0, 0.0));

        let mut solver = ConstraintSolver::new(10);
        solver.add(&world, a, b, 0.5);
        assert_eq!(solver.len(), 1);

        solver.remove_between(b, a);
        assert!(solver.is_empty());
    }

    #[test]
    fn destroyed_bodies_drop_their_constraints() {
        let mut world = quiet_world();
        let a = add_sphere(&mut world, Vec3::zeros());
        let b = add_sphere(&mut world, Vec3::new(1.0, 0.0, 0.0));

        let mut solver = ConstraintSolver::new(10);
        solver.add(&world, a, b, 0.5);
        world.destroy_body(b);
        solver.solve(&mut world);

        assert!(solver.is_empty());
    }

    #[test]
    fn static_anchor_does_not_move() {
        let mut world = quiet_world();
        let anchor = world.create_body(BodyKind::Static);
        let bob = add_sphere(&mut world, Vec3::new(0.0, -2.0, 0.0));

        let mut solver = ConstraintSolver::new(10);
        solver.add(&world, anchor, bob, 0.5);

        world.body_mut(bob).unwrap().position = Vec3::new(0.0, -4.0, 0.0);
        for _ in 0..50 {
            solver.solve(&mut world);
        }

        assert_eq!(world.body(anchor).unwrap().position, Vec3::zeros());
        assert_relative_eq!(
            world.body(bob).unwrap().position.y,
            -2.0,
            epsilon = 1.0e-2
        );
    }
}
