/*!
Impulse-based rigid body physics for real-time games.

The crate simulates body motion under forces, detects collisions through a
uniform-grid broad phase and shape-pair narrow phase, resolves contacts with
sequential impulses, manages sleep state, and answers ray and overlap
queries. The code is split for clarity:

- types:      shared data types (shapes, handles, rays, math aliases)
- settings:   simulation tolerances and default parameters
- body:       rigid body state, materials, mass/inertia bookkeeping
- spatial:    uniform-grid broad-phase accelerator
- narrow:     shape-pair narrow-phase tests producing contact manifolds
- solver:     impulse-based contact resolution
- raycast:    ray-shape intersection tests
- world:      `PhysicsWorld` orchestration, events, and queries
- forcefield: explosion and wind force sources
- constraint: distance constraints between body pairs

Construct one [`PhysicsWorld`] and pass it explicitly to whatever needs
physics queries; there is no global instance. Call [`PhysicsWorld::step`]
exactly once per frame.

# Example

```
use odyssey_physics::{BodyKind, PhysicsWorld, Shape, Vec3};

let mut world = PhysicsWorld::new();

let ball = world.create_body(BodyKind::Dynamic);
{
    let body = world.body_mut(ball).unwrap();
    body.position = Vec3::new(0.0, 5.0, 0.0);
    body.shape = Shape::Sphere { radius: 0.5 };
    body.set_mass(1.0);
}

world.step(1.0 / 60.0);
assert!(world.body(ball).unwrap().position.y < 5.0);
```
*/

pub mod body;
pub mod constraint;
pub mod forcefield;
pub mod narrow;
pub mod raycast;
pub mod settings;
pub mod solver;
pub mod spatial;
pub mod types;
pub mod world;

// Re-export the types most callers need.
pub use body::{Body, Material};
pub use constraint::ConstraintSolver;
pub use forcefield::ForceField;
pub use narrow::Contact;
pub use raycast::RayHit;
pub use spatial::SpatialGrid;
pub use types::{
    BodyHandle, BodyKind, LAYER_ALL, LayerMask, Mat3, Ray, RaycastResult, Shape, Vec3,
};
pub use world::{CollisionCallback, CollisionEvent, PhysicsWorld};
