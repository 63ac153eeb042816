/*!
World orchestration: body ownership, the step pipeline, and queries.

`PhysicsWorld` exclusively owns every body in a generational arena and hands
out [`BodyHandle`]s to collaborators (rendering reads positions, gameplay
configures bodies and reads them back). One `step` per frame runs:

1. rebuild the spatial grid from awake bodies,
2. broad phase over grid candidates, narrow phase on each unordered pair,
3. a fixed number of sub-steps, each integrating forces, resolving the
   contact list, integrating velocities, and updating sleep state,
4. accumulator/contact cleanup and collision event delivery.

Collision events are buffered during the step and delivered only after the
pipeline has finished touching bodies: first to the registered callback, then
via [`PhysicsWorld::drain_events`] for polling callers. Nothing user-visible
runs mid-traversal, so callbacks cannot re-enter the step.
*/

use log::{debug, trace};

use crate::body::Body;
use crate::narrow::{self, Contact};
use crate::raycast::ray_shape;
use crate::settings::{
    DEFAULT_AIR_DENSITY, DEFAULT_CELL_SIZE, DEFAULT_ITERATIONS, DEFAULT_TIME_SCALE,
    DRAG_MIN_SPEED, SLEEP_DURATION, SLEEP_THRESHOLD, SUBSTEPS, default_gravity,
};
use crate::solver::resolve_contact;
use crate::spatial::SpatialGrid;
use crate::types::{BodyHandle, BodyKind, LayerMask, Ray, RaycastResult, Shape, Vec3};

/// A collision detected during the last `step`, delivered after the step
/// completes.
#[derive(Copy, Clone, Debug)]
pub struct CollisionEvent {
    pub a: BodyHandle,
    pub b: BodyHandle,
    pub contact: Contact,
}

/// Gameplay reaction hook. Runs after `step` finishes, once per event.
pub type CollisionCallback = Box<dyn FnMut(BodyHandle, BodyHandle, &Contact)>;

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// The physics world: owns all bodies and drives the simulation.
pub struct PhysicsWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
    grid: SpatialGrid,
    contacts: Vec<Contact>,
    events: Vec<CollisionEvent>,
    callback: Option<CollisionCallback>,

    gravity: Vec3,
    air_density: f32,
    time_scale: f32,
    iterations: u32,

    body_count: usize,
    contact_count: usize,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        debug!("creating physics world (cell size {DEFAULT_CELL_SIZE})");
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            grid: SpatialGrid::new(DEFAULT_CELL_SIZE),
            contacts: Vec::new(),
            events: Vec::new(),
            callback: None,
            gravity: default_gravity(),
            air_density: DEFAULT_AIR_DENSITY,
            time_scale: DEFAULT_TIME_SCALE,
            iterations: DEFAULT_ITERATIONS,
            body_count: 0,
            contact_count: 0,
        }
    }

    // ---- body management -------------------------------------------------

    /// Create a body of the given kind and return its handle. Never fails.
    ///
    /// Static bodies are created with mass 0 (infinite mass).
    pub fn create_body(&mut self, kind: BodyKind) -> BodyHandle {
        let mut body = Body {
            kind,
            ..Body::default()
        };
        if kind == BodyKind::Static {
            body.set_mass(0.0);
        }

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].body = Some(body);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.body_count += 1;

        let handle = BodyHandle {
            index,
            generation: self.slots[index as usize].generation,
        };
        debug!("created body {index} ({kind:?})");
        handle
    }

    /// Destroy a body. Silent no-op if the handle is stale or already
    /// destroyed. The slot's generation is bumped so outstanding handles to
    /// the old body resolve to `None`, and the grid and contact list are
    /// rebuilt without it on the next step.
    pub fn destroy_body(&mut self, handle: BodyHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation != handle.generation || slot.body.is_none() {
            return;
        }
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.body_count -= 1;
        debug!("destroyed body {}", handle.index);
    }

    /// Borrow a body. `None` if the handle is stale.
    #[inline]
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref()
    }

    /// Mutably borrow a body. `None` if the handle is stale.
    #[inline]
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut()
    }

    /// Iterate over all live bodies with their handles.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    /// Number of live bodies.
    #[inline]
    pub fn body_count(&self) -> usize {
        self.body_count
    }

    /// Number of contacts produced by the last step.
    #[inline]
    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    // ---- global parameters ----------------------------------------------

    #[inline]
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    #[inline]
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    #[inline]
    pub fn set_air_density(&mut self, density: f32) {
        self.air_density = density;
    }

    #[inline]
    pub fn air_density(&self) -> f32 {
        self.air_density
    }

    #[inline]
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Solver iteration count. Stored for future tuning; the current solver
    /// runs a single pass per contact per sub-step.
    #[inline]
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    // ---- events ----------------------------------------------------------

    /// Register the collision callback invoked after each step, once per
    /// detected contact.
    pub fn set_collision_callback<F>(&mut self, callback: F)
    where
        F: FnMut(BodyHandle, BodyHandle, &Contact) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Take the collision events buffered by the last step. Events are also
    /// discarded at the start of the next step, so polling is optional.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- stepping --------------------------------------------------------

    /// Advance the simulation by `dt` seconds (scaled by the global time
    /// scale), running broad/narrow phase once and three equal sub-steps of
    /// integration and contact resolution.
    pub fn step(&mut self, dt: f32) {
        let dt = dt * self.time_scale;
        if dt <= 0.0 {
            return;
        }

        self.events.clear();
        self.rebuild_grid();
        self.detect_collisions();

        let sub_dt = dt / SUBSTEPS as f32;
        for _ in 0..SUBSTEPS {
            self.integrate_forces(sub_dt);
            self.resolve_contacts();
            self.integrate_velocities(sub_dt);
            self.update_sleep(sub_dt);
        }

        for slot in &mut self.slots {
            if let Some(body) = slot.body.as_mut() {
                body.force = Vec3::zeros();
                body.torque = Vec3::zeros();
            }
        }
        self.contact_count = self.contacts.len();
        self.contacts.clear();

        trace!(
            "step dt={dt:.4}: {} bodies, {} contacts",
            self.body_count, self.contact_count
        );
        self.deliver_events();
    }

    /// Rebuild the spatial grid from all currently awake bodies.
    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(body) = &slot.body {
                if body.awake {
                    self.grid
                        .insert(index, body.position, body.shape.bounding_radius());
                }
            }
        }
    }

    /// Broad phase over grid candidates, then narrow phase on each unordered
    /// pair exactly once. Detected contacts are buffered both for the solver
    /// and as collision events.
    fn detect_collisions(&mut self) {
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(body) = &slot.body else { continue };
            if !body.awake {
                continue;
            }
            let check_radius = body.shape.bounding_radius();
            for neighbor in self.grid.query(body.position, check_radius * 2.0) {
                // Index ordering forms each unordered pair exactly once.
                if index < neighbor {
                    pairs.push((index, neighbor));
                }
            }
        }

        for (i, j) in pairs {
            let (Some(a), Some(b)) = (self.body_at(i), self.body_at(j)) else {
                continue;
            };
            if let Some(contact) = narrow::collide(i, j, a, b) {
                self.events.push(CollisionEvent {
                    a: self.handle_at(i),
                    b: self.handle_at(j),
                    contact,
                });
                self.contacts.push(contact);
            }
        }
    }

    /// Gravity, quadratic drag, and torque integration for awake dynamic
    /// bodies. Linear acceleration is derived here and applied to velocity
    /// in [`Self::integrate_velocities`], after contact resolution.
    ///
    /// The force accumulator itself is left untouched so externally applied
    /// forces act across all sub-steps; gravity and drag are environmental
    /// and recomputed per sub-step on top of it.
    fn integrate_forces(&mut self, dt: f32) {
        let gravity = self.gravity;
        let air_density = self.air_density;
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if body.kind != BodyKind::Dynamic || !body.awake {
                continue;
            }

            let mut force = body.force + gravity * body.mass;

            let speed = body.velocity.norm();
            if air_density > 0.0 && speed > DRAG_MIN_SPEED {
                force += body.velocity * (-0.5 * air_density * speed);
            }

            body.acceleration = force * body.inverse_mass;

            let angular_acceleration = body.inverse_inertia_tensor * body.torque;
            body.angular_velocity += angular_acceleration * dt;
            body.angular_velocity *= 1.0 - body.material.damping * dt;
        }
    }

    fn resolve_contacts(&mut self) {
        let contacts = std::mem::take(&mut self.contacts);
        for contact in &contacts {
            if let Some((a, b)) = self.pair_mut(contact.a, contact.b) {
                resolve_contact(a, b, contact);
            }
        }
        self.contacts = contacts;
    }

    /// Velocity and position integration. Dynamic bodies apply their derived
    /// acceleration and linear damping; kinematic bodies integrate their
    /// externally-set velocity without forces, drag, or damping.
    fn integrate_velocities(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if !body.awake {
                continue;
            }
            match body.kind {
                BodyKind::Dynamic => {
                    body.velocity += body.acceleration * dt;
                    body.velocity *= 1.0 - body.material.damping * dt;
                    body.position += body.velocity * dt;
                }
                BodyKind::Kinematic => {
                    body.position += body.velocity * dt;
                }
                BodyKind::Static => {}
            }
        }
    }

    /// Accumulate sleep time for slow dynamic bodies; put them to sleep and
    /// zero their velocities once the timer passes the sleep duration.
    fn update_sleep(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if body.kind != BodyKind::Dynamic {
                continue;
            }
            let slow = body.velocity.norm() < SLEEP_THRESHOLD
                && body.angular_velocity.norm() < SLEEP_THRESHOLD;
            if slow {
                body.sleep_timer += dt;
                if body.sleep_timer >= SLEEP_DURATION {
                    body.awake = false;
                    body.velocity = Vec3::zeros();
                    body.angular_velocity = Vec3::zeros();
                }
            } else {
                body.sleep_timer = 0.0;
                body.awake = true;
            }
        }
    }

    /// Invoke the registered callback for every buffered event. Runs after
    /// the step pipeline has released all bodies.
    fn deliver_events(&mut self) {
        let Some(mut callback) = self.callback.take() else {
            return;
        };
        for event in &self.events {
            callback(event.a, event.b, &event.contact);
        }
        self.callback = Some(callback);
    }

    // ---- queries ---------------------------------------------------------

    /// Cast a ray against all bodies whose layer matches `mask`, returning
    /// the nearest hit within the ray's maximum distance.
    pub fn raycast(&self, ray: &Ray, mask: LayerMask) -> RaycastResult {
        let mut result = RaycastResult::default();
        let mut closest = ray.max_distance;
        if ray.direction == Vec3::zeros() {
            return result;
        }

        for (handle, body) in self.bodies() {
            if body.layer & mask == 0 {
                continue;
            }
            if let Some(hit) = ray_shape(body, ray) {
                if hit.distance < closest {
                    closest = hit.distance;
                    result = RaycastResult {
                        hit: true,
                        point: hit.point,
                        normal: hit.normal,
                        distance: hit.distance,
                        body: Some(handle),
                    };
                }
            }
        }
        result
    }

    /// All hits along a ray, nearest first.
    pub fn raycast_all(&self, ray: &Ray, mask: LayerMask) -> Vec<RaycastResult> {
        if ray.direction == Vec3::zeros() {
            return Vec::new();
        }

        let mut results: Vec<RaycastResult> = self
            .bodies()
            .filter(|(_, body)| body.layer & mask != 0)
            .filter_map(|(handle, body)| {
                let hit = ray_shape(body, ray)?;
                (hit.distance <= ray.max_distance).then_some(RaycastResult {
                    hit: true,
                    point: hit.point,
                    normal: hit.normal,
                    distance: hit.distance,
                    body: Some(handle),
                })
            })
            .collect();
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }

    /// Bodies whose shape overlaps the query sphere.
    pub fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<BodyHandle> {
        self.bodies()
            .filter(|(_, body)| body.layer & mask != 0)
            .filter(|(_, body)| match body.shape {
                Shape::Sphere { radius: r } => (body.position - center).norm() < r + radius,
                Shape::Box { extents } => {
                    (closest_on_aabb(center, body.position, extents * 0.5) - center).norm() < radius
                }
                _ => (body.position - center).norm() < body.shape.bounding_radius() + radius,
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Bodies whose shape overlaps the query box (axis-aligned,
    /// half-extents).
    pub fn overlap_box(&self, center: Vec3, half_extents: Vec3, mask: LayerMask) -> Vec<BodyHandle> {
        let query_min = center - half_extents;
        let query_max = center + half_extents;
        self.bodies()
            .filter(|(_, body)| body.layer & mask != 0)
            .filter(|(_, body)| match body.shape {
                Shape::Sphere { radius } => {
                    let closest = closest_on_aabb(body.position, center, half_extents);
                    (closest - body.position).norm() < radius
                }
                Shape::Box { extents } => {
                    let body_min = body.position - extents * 0.5;
                    let body_max = body.position + extents * 0.5;
                    aabb_overlap(query_min, query_max, body_min, body_max)
                }
                _ => {
                    let closest = closest_on_aabb(body.position, center, half_extents);
                    (closest - body.position).norm() < body.shape.bounding_radius()
                }
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    // ---- internals -------------------------------------------------------

    #[inline]
    fn body_at(&self, index: usize) -> Option<&Body> {
        self.slots.get(index).and_then(|slot| slot.body.as_ref())
    }

    #[inline]
    fn handle_at(&self, index: usize) -> BodyHandle {
        BodyHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    /// Disjoint mutable borrows of two bodies by arena index.
    fn pair_mut(&mut self, i: usize, j: usize) -> Option<(&mut Body, &mut Body)> {
        debug_assert_ne!(i, j);
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.slots.split_at_mut(hi);
        let a = head.get_mut(lo)?.body.as_mut()?;
        let b = tail.first_mut()?.body.as_mut()?;
        if i < j { Some((a, b)) } else { Some((b, a)) }
    }
}

/// Closest point on an axis-aligned box to `point`.
#[inline]
fn closest_on_aabb(point: Vec3, center: Vec3, half_extents: Vec3) -> Vec3 {
    let min = center - half_extents;
    let max = center + half_extents;
    Vec3::new(
        point.x.clamp(min.x, max.x),
        point.y.clamp(min.y, max.y),
        point.z.clamp(min.z, max.z),
    )
}

#[inline]
fn aabb_overlap(a_min: Vec3, a_max: Vec3, b_min: Vec3, b_max: Vec3) -> bool {
    a_max.x > b_min.x
        && a_min.x < b_max.x
        && a_max.y > b_min.y
        && a_min.y < b_max.y
        && a_max.z > b_min.z
        && a_min.z < b_max.z
}
