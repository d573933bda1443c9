//! Differential drive kinematics with stop-on-contact collisions

use super::config::RobotConfig;
use super::world::World;
use std::f32::consts::{PI, TAU};

/// Points checked around the robot circumference
const COLLISION_SAMPLES: usize = 8;

/// Physics state for the simulated car
#[derive(Debug, Clone)]
pub struct PhysicsState {
    /// X position in arena frame (meters)
    x: f32,
    /// Y position in arena frame (meters)
    y: f32,
    /// Orientation angle (radians, CCW from +X)
    theta: f32,
    robot_radius: f32,
}

impl PhysicsState {
    pub fn new(x: f32, y: f32, theta: f32, config: &RobotConfig) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
            robot_radius: config.robot_radius,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Advance by `dt` seconds with the given wheel surface speeds (m/s)
    ///
    /// Returns true if the move was blocked. A blocked move still applies the
    /// rotation, so turning in place against a wall works.
    pub fn update(
        &mut self,
        dt: f32,
        left_vel: f32,
        right_vel: f32,
        world: &World,
        config: &RobotConfig,
    ) -> bool {
        let left_vel = left_vel.clamp(-config.max_wheel_speed, config.max_wheel_speed);
        let right_vel = right_vel.clamp(-config.max_wheel_speed, config.max_wheel_speed);

        // v = (v_r + v_l) / 2, ω = (v_r - v_l) / wheel_base
        let linear_vel = (left_vel + right_vel) / 2.0;
        let angular_vel = (right_vel - left_vel) / config.wheel_base;

        let (new_x, new_y, new_theta) = if angular_vel.abs() < 1e-6 {
            let new_x = self.x + linear_vel * self.theta.cos() * dt;
            let new_y = self.y + linear_vel * self.theta.sin() * dt;
            (new_x, new_y, self.theta)
        } else {
            // Arc motion
            let r = linear_vel / angular_vel;
            let new_theta = self.theta + angular_vel * dt;
            let new_x = self.x + r * (new_theta.sin() - self.theta.sin());
            let new_y = self.y + r * (self.theta.cos() - new_theta.cos());
            (new_x, new_y, new_theta)
        };

        self.theta = normalize_angle(new_theta);
        if self.check_collision(new_x, new_y, world) {
            return true;
        }
        self.x = new_x;
        self.y = new_y;
        false
    }

    fn check_collision(&self, x: f32, y: f32, world: &World) -> bool {
        (0..COLLISION_SAMPLES).any(|i| {
            let angle = (i as f32 / COLLISION_SAMPLES as f32) * TAU;
            world.is_occupied(
                x + self.robot_radius * angle.cos(),
                y + self.robot_radius * angle.sin(),
            )
        }) || world.is_occupied(x, y)
    }

    /// World position of a point `forward` meters ahead of the center
    pub fn point_ahead(&self, forward: f32) -> (f32, f32) {
        (
            self.x + forward * self.theta.cos(),
            self.y + forward * self.theta.sin(),
        )
    }
}

/// Normalize angle to [-π, π)
fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a >= PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::config::{RectConfig, SimulationConfig};
    use approx::assert_relative_eq;

    fn open_world() -> World {
        World::new(&SimulationConfig {
            arena_width: 10.0,
            arena_height: 10.0,
            obstacles: vec![],
            marks: vec![],
            ..Default::default()
        })
    }

    #[test]
    fn test_straight_line() {
        let config = RobotConfig::default();
        let world = open_world();
        let mut physics = PhysicsState::new(5.0, 5.0, 0.0, &config);

        for _ in 0..100 {
            assert!(!physics.update(0.01, 0.2, 0.2, &world, &config));
        }
        assert_relative_eq!(physics.x(), 5.2, epsilon = 1e-3);
        assert_relative_eq!(physics.y(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_turn_in_place() {
        let config = RobotConfig::default();
        let world = open_world();
        let mut physics = PhysicsState::new(5.0, 5.0, 0.0, &config);

        // Left wheel back, right wheel forward: counter-clockwise
        let speed = 0.1;
        let omega = 2.0 * speed / config.wheel_base;
        let t = (PI / 2.0) / omega;
        let steps = 100;
        for _ in 0..steps {
            physics.update(t / steps as f32, -speed, speed, &world, &config);
        }
        assert_relative_eq!(physics.theta(), PI / 2.0, epsilon = 1e-3);
        assert_relative_eq!(physics.x(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_speed_is_clamped() {
        let config = RobotConfig::default();
        let world = open_world();
        let mut physics = PhysicsState::new(5.0, 5.0, 0.0, &config);
        physics.update(1.0, 5.0, 5.0, &world, &config);
        assert_relative_eq!(physics.x(), 5.0 + config.max_wheel_speed, epsilon = 1e-4);
    }

    #[test]
    fn test_blocked_by_obstacle() {
        let config = RobotConfig::default();
        let world = World::new(&SimulationConfig {
            arena_width: 10.0,
            arena_height: 10.0,
            obstacles: vec![RectConfig::new(5.1, 4.0, 0.5, 2.0)],
            marks: vec![],
            ..Default::default()
        });
        let mut physics = PhysicsState::new(5.0, 5.0, 0.0, &config);
        let mut blocked = false;
        for _ in 0..100 {
            blocked |= physics.update(0.01, 0.2, 0.2, &world, &config);
        }
        assert!(blocked);
        assert!(physics.x() + config.robot_radius <= 5.1);
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-5);
    }
}
