//! Analog sensor response models
//!
//! Range sensors see the arena through a single ray from the chassis edge;
//! their output falls off as 1/distance like the IR triangulation parts on
//! the real car. The mark sensor reads the floor just ahead of center.

use super::config::SensorModelConfig;
use super::physics::PhysicsState;
use super::world::World;
use crate::core::types::{ADC_MAX, Channel};

#[derive(Debug, Clone)]
pub struct SensorModel {
    config: SensorModelConfig,
    robot_radius: f32,
}

impl SensorModel {
    pub fn new(config: &SensorModelConfig, robot_radius: f32) -> Self {
        Self {
            config: config.clone(),
            robot_radius,
        }
    }

    /// Noise-free reading of one channel at the current pose
    pub fn read(&self, channel: Channel, world: &World, pose: &PhysicsState) -> u16 {
        match channel {
            Channel::Mark => self.mark_counts(world, pose),
            Channel::Front => self.range_counts(self.range_to_obstacle(world, pose, 0.0)),
            Channel::Left => {
                self.range_counts(self.range_to_obstacle(world, pose, self.config.side_angle))
            }
            Channel::Right => {
                self.range_counts(self.range_to_obstacle(world, pose, -self.config.side_angle))
            }
        }
    }

    /// Distance from the chassis edge along `bearing` (relative to heading)
    pub fn range_to_obstacle(&self, world: &World, pose: &PhysicsState, bearing: f32) -> f32 {
        let angle = pose.theta() + bearing;
        let ox = pose.x() + self.robot_radius * angle.cos();
        let oy = pose.y() + self.robot_radius * angle.sin();
        world.ray_cast(ox, oy, angle, self.config.max_range)
    }

    /// ADC counts for a range in meters
    pub fn range_counts(&self, distance_m: f32) -> u16 {
        if distance_m >= self.config.max_range {
            return self.config.floor_counts;
        }
        let distance_cm = (distance_m * 100.0).max(1.0);
        let counts = self.config.range_gain / distance_cm;
        counts
            .round()
            .clamp(f32::from(self.config.floor_counts), f32::from(ADC_MAX)) as u16
    }

    fn mark_counts(&self, world: &World, pose: &PhysicsState) -> u16 {
        let (x, y) = pose.point_ahead(self.config.mark_offset);
        if world.mark_at(x, y) {
            self.config.mark_on_counts
        } else {
            self.config.mark_off_counts
        }
    }
}
