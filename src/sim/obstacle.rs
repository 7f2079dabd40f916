//! A single collidable cube obstacle
//!
//! Obstacles are pooled 25-per-board at construction and never reallocated;
//! boards reset them in place when they recycle.

use glam::Vec3;

use crate::consts::{COLLISION_HALF_EXTENT, RECYCLE_DISTANCE};

/// One cube in a board's 5x5 grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// World position; rotation is implicitly identity
    pub position: Vec3,
    /// Once true the obstacle is inert for collision and plays its
    /// fracture animation instead of normal rendering
    pub is_fractured: bool,
    /// Impact point driving the outward-fracture animation
    pub fracture_origin: Vec3,
    /// Seconds since fracture, advanced by the owning board
    pub fracture_age: f32,
}

impl Obstacle {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            is_fractured: false,
            fracture_origin: Vec3::ZERO,
            fracture_age: 0.0,
        }
    }

    /// Translate along the forward axis. No validation; the caller
    /// guarantees consistent units.
    pub fn advance(&mut self, delta_z: f32) {
        self.position.z += delta_z;
    }

    /// Age the fracture animation by `dt` seconds.
    pub fn age_fracture(&mut self, dt: f32) {
        if self.is_fractured {
            self.fracture_age += dt;
        }
    }

    /// Axis-aligned square overlap against the ship, x/y only.
    ///
    /// z is deliberately not part of the test: the owning board restricts
    /// collision queries to the camera-plane band before calling this.
    /// Both bodies use a fixed half extent of 1 unit.
    pub fn overlaps(&self, ship_position: Vec3) -> bool {
        let reach = 2.0 * COLLISION_HALF_EXTENT;
        (ship_position.x - self.position.x).abs() <= reach
            && (ship_position.y - self.position.y).abs() <= reach
    }

    /// Mark the obstacle fractured at `point`. Idempotent: the first call
    /// wins, later calls leave all state unchanged.
    pub fn fracture_at(&mut self, point: Vec3) {
        if self.is_fractured {
            return;
        }
        self.is_fractured = true;
        self.fracture_origin = point;
        self.fracture_age = 0.0;
    }

    /// In-place reset when the owning board recycles: jump back down the
    /// track and clear any fracture state. Identity is preserved.
    pub fn recycle(&mut self) {
        self.position.z -= RECYCLE_DISTANCE;
        self.is_fractured = false;
        self.fracture_origin = Vec3::ZERO;
        self.fracture_age = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_translates_forward_only() {
        let mut obstacle = Obstacle::new(Vec3::new(-8.0, 11.0, -100.0));
        obstacle.advance(2.5);
        assert_eq!(obstacle.position, Vec3::new(-8.0, 11.0, -97.5));
    }

    #[test]
    fn overlaps_ignores_z() {
        let obstacle = Obstacle::new(Vec3::new(0.0, 0.0, -250.0));
        // Same x/y, wildly different z: still an overlap. The z window is
        // the caller's job.
        assert!(obstacle.overlaps(Vec3::new(0.0, 0.0, 0.0)));
        assert!(obstacle.overlaps(Vec3::new(2.0, -2.0, 500.0)));
        assert!(!obstacle.overlaps(Vec3::new(2.1, 0.0, 0.0)));
        assert!(!obstacle.overlaps(Vec3::new(0.0, -2.1, 0.0)));
    }

    #[test]
    fn fracture_is_idempotent() {
        let mut obstacle = Obstacle::new(Vec3::ZERO);
        let p1 = Vec3::new(0.5, -0.25, 0.0);
        let p2 = Vec3::new(-3.0, 3.0, 1.0);

        obstacle.fracture_at(p1);
        obstacle.age_fracture(0.4);
        obstacle.fracture_at(p2);

        assert!(obstacle.is_fractured);
        assert_eq!(obstacle.fracture_origin, p1);
        assert!((obstacle.fracture_age - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn fractured_obstacles_stay_put_in_xy() {
        let mut obstacle = Obstacle::new(Vec3::new(4.0, 7.0, 0.0));
        obstacle.fracture_at(Vec3::new(4.5, 7.0, 0.0));
        obstacle.advance(1.0);
        assert_eq!(obstacle.position, Vec3::new(4.0, 7.0, 1.0));
    }

    #[test]
    fn recycle_resets_in_place() {
        let mut obstacle = Obstacle::new(Vec3::new(-8.0, 11.0, 50.0));
        obstacle.fracture_at(Vec3::ZERO);
        obstacle.age_fracture(1.0);
        obstacle.recycle();

        assert_eq!(obstacle.position, Vec3::new(-8.0, 11.0, -250.0));
        assert!(!obstacle.is_fractured);
        assert_eq!(obstacle.fracture_age, 0.0);
    }
}
