//! Small fixed-step rigid body for the throwable bottle. The body
//! starts pinned in place and only begins integrating after its
//! one-shot release.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);
pub const TIME_STEP: f32 = 1.0 / 60.0;

/// Impulse given to the bottle when clicked.
pub const RELEASE_VELOCITY: Vec3 = Vec3::new(1.0, 2.0, 0.5);
pub const RELEASE_ANGULAR_VELOCITY: Vec3 = Vec3::new(0.0, 0.0, FRAC_PI_2);

/// Room interior the body is kept inside of.
const WALL_EXTENT: f32 = 5.0;
const GROUND_FRICTION: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Pinned; gravity does not apply and clicks can still release it.
    AtRest,
    /// Free-falling; further release calls are ignored.
    Released,
}

#[derive(Debug)]
pub struct PropBody {
    pub position: Vec3,
    /// Euler angles, copied straight into the prop node's transform.
    pub rotation: Vec3,
    velocity: Vec3,
    angular_velocity: Vec3,
    half_extents: Vec3,
    state: BodyState,
}

impl PropBody {
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            half_extents,
            state: BodyState::AtRest,
        }
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    /// One-shot launch. Returns false when the body was already
    /// released, leaving its motion untouched.
    pub fn release(&mut self) -> bool {
        if self.state == BodyState::Released {
            return false;
        }
        self.state = BodyState::Released;
        self.velocity = RELEASE_VELOCITY;
        self.angular_velocity = RELEASE_ANGULAR_VELOCITY;
        true
    }

    /// Advances one fixed tick. A pinned body does not move.
    pub fn step(&mut self) {
        if self.state != BodyState::Released {
            return;
        }

        self.velocity += GRAVITY * TIME_STEP;
        self.position += self.velocity * TIME_STEP;
        self.rotation += self.angular_velocity * TIME_STEP;

        // Floor contact: settle onto the ground plane and bleed off
        // motion so the body comes to rest instead of sliding forever
        let floor = self.half_extents.y;
        if self.position.y < floor {
            self.position.y = floor;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            self.velocity.x *= GROUND_FRICTION;
            self.velocity.z *= GROUND_FRICTION;
            self.angular_velocity *= GROUND_FRICTION;
        }

        // Wall containment on both horizontal axes
        let limit_x = WALL_EXTENT - self.half_extents.x;
        if self.position.x.abs() > limit_x {
            self.position.x = self.position.x.clamp(-limit_x, limit_x);
            self.velocity.x = 0.0;
        }
        let limit_z = WALL_EXTENT - self.half_extents.z;
        if self.position.z.abs() > limit_z {
            self.position.z = self.position.z.clamp(-limit_z, limit_z);
            self.velocity.z = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bottle() -> PropBody {
        PropBody::new(Vec3::new(2.3, 2.92, -2.5), Vec3::splat(0.2))
    }

    #[test]
    fn test_body_stays_pinned_until_released() {
        let mut body = bottle();
        let start = body.position;
        for _ in 0..120 {
            body.step();
        }
        assert_eq!(body.position, start);
        assert_eq!(body.state(), BodyState::AtRest);
    }

    #[test]
    fn test_release_is_one_shot() {
        let mut body = bottle();
        assert!(body.release());
        assert!(!body.release());
        assert_eq!(body.state(), BodyState::Released);
    }

    #[test]
    fn test_released_body_settles_on_the_floor() {
        let mut body = bottle();
        body.release();
        for _ in 0..3_000 {
            body.step();
        }
        assert!((body.position.y - 0.2).abs() < 1e-3, "y = {}", body.position.y);
    }

    #[test]
    fn test_body_never_escapes_the_room() {
        let mut body = bottle();
        body.release();
        for _ in 0..3_000 {
            body.step();
            assert!(body.position.x.abs() <= 4.81);
            assert!(body.position.z.abs() <= 4.81);
            assert!(body.position.y >= 0.19);
        }
    }

    #[test]
    fn test_release_spins_the_body() {
        let mut body = bottle();
        body.release();
        body.step();
        assert!(body.rotation.z > 0.0);
    }
}
