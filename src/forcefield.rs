/*!
Environmental forces: explosions and wind.

A `ForceField` is driven by the game loop alongside the world: call
[`ForceField::update`] once per frame before `PhysicsWorld::step`. Explosions
push dynamic bodies radially with inverse-square falloff and expire after
their duration; wind is a constant force on every dynamic body.
*/

use crate::types::{BodyKind, Vec3};
use crate::world::PhysicsWorld;

struct Explosion {
    center: Vec3,
    radius: f32,
    strength: f32,
    duration: f32,
    elapsed: f32,
}

/// Explosion and wind force source feeding a [`PhysicsWorld`].
#[derive(Default)]
pub struct ForceField {
    explosions: Vec<Explosion>,
    wind: Vec3,
}

impl ForceField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an explosion at `center` affecting bodies within `radius`
    /// for `duration` seconds.
    pub fn add_explosion(&mut self, center: Vec3, radius: f32, strength: f32, duration: f32) {
        self.explosions.push(Explosion {
            center,
            radius,
            strength,
            duration,
            elapsed: 0.0,
        });
    }

    /// Constant wind force applied to every dynamic body each update.
    #[inline]
    pub fn set_wind(&mut self, wind: Vec3) {
        self.wind = wind;
    }

    /// Number of explosions still in flight.
    #[inline]
    pub fn active_explosions(&self) -> usize {
        self.explosions.len()
    }

    /// Apply all live forces to the world's dynamic bodies and retire
    /// expired explosions. Call once per frame before stepping.
    pub fn update(&mut self, dt: f32, world: &mut PhysicsWorld) {
        let handles: Vec<_> = world
            .bodies()
            .filter(|(_, body)| body.kind == BodyKind::Dynamic)
            .map(|(handle, _)| handle)
            .collect();

        for explosion in &mut self.explosions {
            explosion.elapsed += dt;
            for &handle in &handles {
                let Some(body) = world.body_mut(handle) else {
                    continue;
                };
                let delta = body.position - explosion.center;
                let distance = delta.norm();
                if distance <= 0.0 || distance >= explosion.radius {
                    continue;
                }
                // Radial push with inverse-square falloff.
                let magnitude = explosion.strength / (1.0 + distance * distance);
                body.apply_force(delta / distance * magnitude);
            }
        }
        self.explosions.retain(|e| e.elapsed < e.duration);

        if self.wind != Vec3::zeros() {
            for &handle in &handles {
                if let Some(body) = world.body_mut(handle) {
                    body.apply_force(self.wind);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;

    fn world_with_sphere(position: Vec3) -> (PhysicsWorld, crate::types::BodyHandle) {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec3::zeros());
        world.set_air_density(0.0);
        let handle = world.create_body(BodyKind::Dynamic);
        let body = world.body_mut(handle).unwrap();
        body.position = position;
        body.shape = Shape::Sphere { radius: 0.5 };
        (world, handle)
    }

    #[test]
    fn explosion_pushes_bodies_outward() {
        let (mut world, handle) = world_with_sphere(Vec3::new(2.0, 0.0, 0.0));
        let mut field = ForceField::new();
        field.add_explosion(Vec3::zeros(), 10.0, 500.0, 1.0);

        field.update(1.0 / 60.0, &mut world);
        world.step(1.0 / 60.0);

        // Pushed away from the explosion center along +X.
        assert!(world.body(handle).unwrap().velocity.x > 0.0);
    }

    #[test]
    fn explosion_does_not_reach_beyond_radius() {
        let (mut world, handle) = world_with_sphere(Vec3::new(50.0, 0.0, 0.0));
        let mut field = ForceField::new();
        field.add_explosion(Vec3::zeros(), 10.0, 500.0, 1.0);

        field.update(1.0 / 60.0, &mut world);
        world.step(1.0 / 60.0);

        assert_eq!(world.body(handle).unwrap().velocity, Vec3::zeros());
    }

    #[test]
    fn explosions_expire_after_their_duration() {
        let (mut world, _) = world_with_sphere(Vec3::new(2.0, 0.0, 0.0));
        let mut field = ForceField::new();
        field.add_explosion(Vec3::zeros(), 10.0, 500.0, 0.05);

        field.update(0.1, &mut world);
        assert_eq!(field.active_explosions(), 0);
    }

    #[test]
    fn static_bodies_ignore_wind() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec3::zeros());
        let handle = world.create_body(BodyKind::Static);

        let mut field = ForceField::new();
        field.set_wind(Vec3::new(100.0, 0.0, 0.0));
        field.update(1.0 / 60.0, &mut world);
        world.step(1.0 / 60.0);

        assert_eq!(world.body(handle).unwrap().position, Vec3::zeros());
    }

    #[test]
    fn wind_accelerates_dynamic_bodies() {
        let (mut world, handle) = world_with_sphere(Vec3::zeros());
        let mut field = ForceField::new();
        field.set_wind(Vec3::new(10.0, 0.0, 0.0));

        field.update(1.0 / 60.0, &mut world);
        world.step(1.0 / 60.0);

        assert!(world.body(handle).unwrap().velocity.x > 0.0);
    }
}
