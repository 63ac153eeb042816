/*!
Rigid body state and per-body material coefficients.

A [`Body`] is a plain data record owned by the world's arena; all mutation
goes through `PhysicsWorld::body_mut` or the step pipeline. The helpers here
keep the mass/inertia invariants consistent so callers cannot desynchronize
`mass` from `inverse_mass`.
*/

use crate::types::{BodyKind, Mat3, Shape, Vec3};

/// Physical coefficients of a body's surface and interior.
///
/// Immutable per body unless explicitly replaced via `Body::material`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Density in kg/m^3. Reserved for mass-from-volume helpers.
    pub density: f32,
    /// Coulomb friction coefficient. Contacts use the minimum of the pair.
    pub friction: f32,
    /// Bounciness in [0, 1]. Contacts use the minimum of the pair.
    pub restitution: f32,
    /// Linear and angular velocity damping per second.
    pub damping: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.5,
            restitution: 0.3,
            damping: 0.1,
        }
    }
}

/// A rigid body: kinematic state, shape, and material.
///
/// Invariants
/// - `inverse_mass == 0.0` if and only if `mass == 0.0` (infinite mass).
/// - Static bodies have mass 0 and are never integrated.
/// - The inertia tensor is diagonal for the supported shapes and is kept in
///   sync with `mass` and `shape` by [`Body::set_mass`].
#[derive(Clone, Debug)]
pub struct Body {
    /// World-space position of the center of mass.
    pub position: Vec3,
    /// Linear velocity (m/s).
    pub velocity: Vec3,
    /// Linear acceleration derived from the force accumulator each sub-step.
    pub acceleration: Vec3,
    /// Force accumulator, cleared at the end of every full step.
    pub force: Vec3,
    /// Angular velocity (rad/s).
    pub angular_velocity: Vec3,
    /// Torque accumulator, cleared at the end of every full step.
    pub torque: Vec3,
    /// Mass in kg. 0 means infinite mass.
    pub mass: f32,
    /// Multiplicative inverse of `mass`; exactly 0 when `mass` is 0.
    pub inverse_mass: f32,
    /// Inertia tensor in local space (diagonal for sphere and box).
    pub inertia_tensor: Mat3,
    /// Inverse of the inertia tensor.
    pub inverse_inertia_tensor: Mat3,
    /// Kinematic class.
    pub kind: BodyKind,
    /// Collision shape and dimensions.
    pub shape: Shape,
    /// Surface material.
    pub material: Material,
    /// Layer bits tested against query masks. Defaults to layer 1.
    pub layer: u32,
    /// Whether the body participates in integration and the broad phase.
    pub awake: bool,
    /// Seconds spent continuously below the sleep speed threshold.
    pub sleep_timer: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            force: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            torque: Vec3::zeros(),
            mass: 1.0,
            inverse_mass: 1.0,
            inertia_tensor: Mat3::identity(),
            inverse_inertia_tensor: Mat3::identity(),
            kind: BodyKind::Dynamic,
            shape: Shape::Sphere { radius: 1.0 },
            material: Material::default(),
            layer: 1,
            awake: true,
            sleep_timer: 0.0,
        }
    }
}

impl Body {
    /// Set the mass, derive the inverse mass, and recompute the inertia
    /// tensor from the current shape.
    ///
    /// A mass of 0 means infinite mass: the inverse mass becomes exactly 0
    /// and the inverse inertia tensor is zeroed, so neither impulses nor
    /// torques can move the body.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        self.update_inertia_tensor();
    }

    /// Recompute the inertia tensor from `mass` and `shape`.
    ///
    /// - Sphere: solid sphere, 0.4 * m * r^2 on each diagonal entry.
    /// - Box: (1/12) * m * (h^2 + d^2) for Ixx and analogously for the
    ///   other axes, with (w, h, d) the full extents.
    /// - Other shapes (and mass 0): identity tensor with a zero inverse.
    pub fn update_inertia_tensor(&mut self) {
        if self.mass <= 0.0 {
            self.inertia_tensor = Mat3::identity();
            self.inverse_inertia_tensor = Mat3::zeros();
            return;
        }
        match self.shape {
            Shape::Sphere { radius } => {
                let i = 0.4 * self.mass * radius * radius;
                self.inertia_tensor = Mat3::from_diagonal_element(i);
                self.inverse_inertia_tensor = Mat3::from_diagonal_element(1.0 / i);
            }
            Shape::Box { extents } => {
                let w2 = extents.x * extents.x;
                let h2 = extents.y * extents.y;
                let d2 = extents.z * extents.z;
                let ixx = (1.0 / 12.0) * self.mass * (h2 + d2);
                let iyy = (1.0 / 12.0) * self.mass * (w2 + d2);
                let izz = (1.0 / 12.0) * self.mass * (w2 + h2);
                self.inertia_tensor = Mat3::from_diagonal(&Vec3::new(ixx, iyy, izz));
                self.inverse_inertia_tensor =
                    Mat3::from_diagonal(&Vec3::new(1.0 / ixx, 1.0 / iyy, 1.0 / izz));
            }
            _ => {
                self.inertia_tensor = Mat3::identity();
                self.inverse_inertia_tensor = Mat3::identity();
            }
        }
    }

    /// Accumulate a force acting through the center of mass. Wakes the body.
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
        self.wake_up();
    }

    /// Accumulate a force acting at a world-space point, producing torque
    /// `cross(point - position, force)`. Wakes the body.
    pub fn apply_force_at(&mut self, force: Vec3, point: Vec3) {
        self.force += force;
        let r = point - self.position;
        self.torque += r.cross(&force);
        self.wake_up();
    }

    /// Apply an instantaneous impulse through the center of mass:
    /// `velocity += impulse * inverse_mass`. Wakes the body.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse * self.inverse_mass;
        self.wake_up();
    }

    /// Apply an instantaneous impulse at a world-space point, also changing
    /// angular velocity by `inverse_inertia * cross(point - position, impulse)`.
    pub fn apply_impulse_at(&mut self, impulse: Vec3, point: Vec3) {
        self.velocity += impulse * self.inverse_mass;
        let r = point - self.position;
        self.angular_velocity += self.inverse_inertia_tensor * r.cross(&impulse);
        self.wake_up();
    }

    /// Wake the body and reset its sleep timer.
    #[inline]
    pub fn wake_up(&mut self) {
        self.awake = true;
        self.sleep_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_mass_is_zero_iff_mass_is_zero() {
        let mut body = Body::default();

        body.set_mass(4.0);
        assert_relative_eq!(body.inverse_mass, 0.25);

        body.set_mass(0.0);
        assert_eq!(body.mass, 0.0);
        assert_eq!(body.inverse_mass, 0.0);
    }

    #[test]
    fn sphere_inertia_matches_solid_sphere_formula() {
        let mut body = Body {
            shape: Shape::Sphere { radius: 2.0 },
            ..Body::default()
        };
        body.set_mass(3.0);

        // I = 0.4 * m * r^2 = 0.4 * 3 * 4 = 4.8 on each diagonal entry.
        assert_relative_eq!(body.inertia_tensor[(0, 0)], 4.8, epsilon = 1.0e-6);
        assert_relative_eq!(body.inertia_tensor[(1, 1)], 4.8, epsilon = 1.0e-6);
        assert_relative_eq!(body.inertia_tensor[(2, 2)], 4.8, epsilon = 1.0e-6);
        assert_relative_eq!(
            body.inverse_inertia_tensor[(0, 0)],
            1.0 / 4.8,
            epsilon = 1.0e-6
        );
    }

    #[test]
    fn box_inertia_uses_per_axis_extents() {
        let mut body = Body {
            shape: Shape::Box {
                extents: Vec3::new(1.0, 2.0, 3.0),
            },
            ..Body::default()
        };
        body.set_mass(12.0);

        // Ixx = (1/12) * 12 * (4 + 9) = 13, Iyy = (1 + 9) = 10, Izz = (1 + 4) = 5.
        assert_relative_eq!(body.inertia_tensor[(0, 0)], 13.0, epsilon = 1.0e-5);
        assert_relative_eq!(body.inertia_tensor[(1, 1)], 10.0, epsilon = 1.0e-5);
        assert_relative_eq!(body.inertia_tensor[(2, 2)], 5.0, epsilon = 1.0e-5);
    }

    #[test]
    fn zero_mass_body_ignores_impulses() {
        let mut body = Body::default();
        body.set_mass(0.0);

        body.apply_impulse(Vec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(body.velocity.norm(), 0.0);

        body.apply_impulse_at(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(body.angular_velocity.norm(), 0.0);
    }

    #[test]
    fn impulse_at_point_spins_the_body() {
        let mut body = Body::default();
        body.set_mass(1.0);

        // Impulse along +Y applied at +X produces angular velocity about +Z.
        body.apply_impulse_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(body.angular_velocity.z > 0.0);
        assert_relative_eq!(body.velocity.y, 1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn applying_force_wakes_a_sleeping_body() {
        let mut body = Body::default();
        body.awake = false;
        body.sleep_timer = 1.5;

        body.apply_force(Vec3::new(0.0, 1.0, 0.0));
        assert!(body.awake);
        assert_eq!(body.sleep_timer, 0.0);
    }

    #[test]
    fn force_at_offset_point_accumulates_torque() {
        let mut body = Body::default();
        body.apply_force_at(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0));

        // r x F = (0,1,0) x (0,0,1) = (1,0,0).
        assert_relative_eq!(body.torque.x, 1.0, epsilon = 1.0e-6);
        assert_relative_eq!(body.torque.y, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(body.torque.z, 0.0, epsilon = 1.0e-6);
    }
}
