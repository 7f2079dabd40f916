//! Player ship: input integration, play-field clamping, collision tumble

use glam::{Mat4, Vec3};

use super::tick::TickInput;
use crate::consts::{
    FIELD_X_MAX, FIELD_X_MIN, FIELD_Y_MAX, FIELD_Y_MIN, MAX_STEER_ANGLE, RETURN_EPSILON,
    RETURN_RATE, SHIP_SPEED, TURN_RATE,
};

/// Euler-style steering angles
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Yaw from left/right input
    pub horizontal: f32,
    /// Pitch from up/down input
    pub vertical: f32,
    /// Banking roll, follows horizontal steering
    pub tilt: f32,
}

/// Velocities captured at the instant of collision, replayed (scaled by the
/// decaying world speed) to animate the post-collision tumble
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionResponse {
    pub linear: Vec3,
    pub angular: Vec3,
}

/// Ship flight state machine. The only way back to `Flying` is an explicit
/// new-session reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShipPhase {
    #[default]
    Flying,
    Tumbling,
    Idle,
}

/// One instance per game session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ship {
    pub position: Vec3,
    pub rotation: Rotation,
    pub phase: ShipPhase,
    pub collision_response: CollisionResponse,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Rotation::default(),
            phase: ShipPhase::Flying,
            collision_response: CollisionResponse::default(),
        }
    }
}

/// Spring an angle back toward zero, snapping inside the epsilon band so it
/// never decays forever.
fn spring_return(angle: f32, dt: f32) -> f32 {
    let next = angle - angle * RETURN_RATE * dt;
    if next.abs() < RETURN_EPSILON { 0.0 } else { next }
}

/// Integrate a held-direction pair into one steering axis.
fn steer(angle: f32, positive: bool, negative: bool, dt: f32) -> f32 {
    match (positive, negative) {
        (true, false) => (angle + TURN_RATE * dt).min(MAX_STEER_ANGLE),
        (false, true) => (angle - TURN_RATE * dt).max(-MAX_STEER_ANGLE),
        _ => spring_return(angle, dt),
    }
}

impl Ship {
    /// Normal-flight integration: held directions into rotation, rotation
    /// into position, position clamped to the play field.
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        debug_assert_eq!(self.phase, ShipPhase::Flying);

        self.rotation.vertical = steer(self.rotation.vertical, input.up, input.down, dt);
        self.rotation.horizontal = steer(self.rotation.horizontal, input.left, input.right, dt);
        // Bank into the turn
        self.rotation.tilt = steer(self.rotation.tilt, input.left, input.right, dt);

        self.position.x -= SHIP_SPEED * self.rotation.horizontal.sin() * dt;
        self.position.y += SHIP_SPEED * self.rotation.vertical.sin() * dt;
        self.clamp_to_field();
    }

    fn clamp_to_field(&mut self) {
        self.position.x = self.position.x.clamp(FIELD_X_MIN, FIELD_X_MAX);
        self.position.y = self.position.y.clamp(FIELD_Y_MIN, FIELD_Y_MAX);
    }

    /// Record the tumble velocities at the moment of impact and switch to
    /// the tumbling phase.
    pub fn begin_tumble(&mut self) {
        self.collision_response = CollisionResponse {
            linear: Vec3::new(
                -SHIP_SPEED * self.rotation.horizontal.sin(),
                SHIP_SPEED * self.rotation.vertical.sin(),
                0.0,
            ),
            angular: Vec3::new(2.0, 3.0, 1.5),
        };
        self.phase = ShipPhase::Tumbling;
    }

    /// Post-collision drift: replay the recorded response scaled by the
    /// decaying world speed. Mutually exclusive with `update` per frame.
    pub fn apply_collision_response(&mut self, dt: f32, decaying_speed: f32) {
        debug_assert_eq!(self.phase, ShipPhase::Tumbling);

        let scale = decaying_speed * dt;
        self.position += self.collision_response.linear * scale * 0.05;
        self.rotation.horizontal += self.collision_response.angular.y * scale * 0.05;
        self.rotation.vertical += self.collision_response.angular.x * scale * 0.05;
        self.rotation.tilt += self.collision_response.angular.z * scale * 0.05;
        self.clamp_to_field();

        if decaying_speed == 0.0 {
            self.phase = ShipPhase::Idle;
        }
    }

    /// World transform for rendering: translation then yaw/pitch/roll.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.rotation.horizontal)
            * Mat4::from_rotation_x(self.rotation.vertical)
            * Mat4::from_rotation_z(self.rotation.tilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(up: bool, down: bool, left: bool, right: bool) -> TickInput {
        TickInput {
            up,
            down,
            left,
            right,
            start: false,
        }
    }

    #[test]
    fn held_input_steers_and_moves() {
        let mut ship = Ship::default();
        let input = held(true, false, true, false);
        for _ in 0..30 {
            ship.update(&input, 1.0 / 120.0);
        }
        assert!(ship.rotation.vertical > 0.0);
        assert!(ship.rotation.horizontal > 0.0);
        assert!(ship.position.y > 0.0);
        assert!(ship.position.x < 0.0);
    }

    #[test]
    fn steering_clamps_at_max_angle() {
        let mut ship = Ship::default();
        let input = held(true, false, false, false);
        for _ in 0..1200 {
            ship.update(&input, 1.0 / 120.0);
        }
        assert!(ship.rotation.vertical <= MAX_STEER_ANGLE);
    }

    #[test]
    fn released_input_springs_back_to_exactly_zero() {
        let mut ship = Ship::default();
        let press = held(false, false, true, false);
        for _ in 0..30 {
            ship.update(&press, 1.0 / 120.0);
        }
        assert!(ship.rotation.horizontal != 0.0);

        let release = held(false, false, false, false);
        for _ in 0..600 {
            ship.update(&release, 1.0 / 120.0);
        }
        // Snaps to zero inside the epsilon band, no residual jitter
        assert_eq!(ship.rotation.horizontal, 0.0);
        assert_eq!(ship.rotation.tilt, 0.0);
    }

    #[test]
    fn position_clamps_to_field_bounds() {
        let mut ship = Ship::default();
        let input = held(true, false, true, false);
        for _ in 0..5000 {
            ship.update(&input, 1.0 / 120.0);
        }
        assert!(ship.position.x >= FIELD_X_MIN);
        assert!(ship.position.y <= FIELD_Y_MAX);
    }

    #[test]
    fn tumble_phase_runs_to_idle() {
        let mut ship = Ship::default();
        ship.begin_tumble();
        assert_eq!(ship.phase, ShipPhase::Tumbling);

        ship.apply_collision_response(1.0 / 120.0, 40.0);
        assert_eq!(ship.phase, ShipPhase::Tumbling);

        ship.apply_collision_response(1.0 / 120.0, 0.0);
        assert_eq!(ship.phase, ShipPhase::Idle);
    }

    #[test]
    fn tumble_uses_velocities_captured_at_impact() {
        let mut ship = Ship::default();
        let input = held(false, false, true, false);
        for _ in 0..30 {
            ship.update(&input, 1.0 / 120.0);
        }
        ship.begin_tumble();
        let recorded = ship.collision_response;

        // Further input must not change the recorded response
        ship.apply_collision_response(1.0 / 120.0, 40.0);
        assert_eq!(ship.collision_response, recorded);
        assert!(recorded.linear.x < 0.0);
    }
}
