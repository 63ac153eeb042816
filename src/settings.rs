/*!
Simulation tolerances and default parameters.

These constants centralize the tuning knobs used by integration, contact
resolution, and sleep management. Keeping them together makes tuning easier
and helps ensure deterministic behavior across platforms.

Notes
- Distances are in meters, time in seconds.
- Favor practical world-space tolerances over machine epsilon for robust
  behavior.
*/

use crate::types::Vec3;

/// Default gravity vector in meters per second squared.
#[inline]
pub fn default_gravity() -> Vec3 {
    Vec3::new(0.0, -9.81, 0.0)
}

/// Default air density in kg/m^3 used by the quadratic drag force.
pub const DEFAULT_AIR_DENSITY: f32 = 1.2;

/// Default global time scale. 1.0 is real time.
pub const DEFAULT_TIME_SCALE: f32 = 1.0;

/// Default solver iteration count. The current solver runs a single pass per
/// contact per sub-step; the count is stored for future tuning.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// Number of equal sub-steps each `step` is split into for stability.
pub const SUBSTEPS: u32 = 3;

/// Cell size of the uniform broad-phase grid (meters).
pub const DEFAULT_CELL_SIZE: f32 = 2.0;

/// Linear and angular speed (m/s, rad/s) below which a body accumulates
/// sleep time.
pub const SLEEP_THRESHOLD: f32 = 0.1;

/// Time a body must stay below [`SLEEP_THRESHOLD`] before it is put to
/// sleep (seconds).
pub const SLEEP_DURATION: f32 = 2.0;

/// Penetration depth tolerated before positional correction kicks in
/// (meters). Too small causes jitter on resting contacts.
pub const PENETRATION_SLOP: f32 = 0.01;

/// Fraction of the remaining penetration corrected per resolution pass.
pub const CORRECTION_PERCENT: f32 = 0.2;

/// Minimum speed (m/s) at which quadratic drag is applied. Below this the
/// drag force is negligible and skipped.
pub const DRAG_MIN_SPEED: f32 = 0.1;

/// Minimum tangential speed (m/s) worth applying friction to. Below this
/// the tangent direction is numerically unreliable.
pub const FRICTION_MIN_SPEED: f32 = 1.0e-3;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;
