//! Arena model: walls, obstacle boxes and floor marks

use super::config::{RectConfig, SimulationConfig};

/// Ray-cast step (meters)
const RAY_STEP: f32 = 0.005;

/// Axis-aligned box in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl Rect {
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

impl From<&RectConfig> for Rect {
    fn from(r: &RectConfig) -> Self {
        Self {
            x_min: r.x,
            y_min: r.y,
            x_max: r.x + r.width,
            y_max: r.y + r.height,
        }
    }
}

/// Static arena contents
#[derive(Debug, Clone)]
pub struct World {
    width: f32,
    height: f32,
    obstacles: Vec<Rect>,
    marks: Vec<Rect>,
}

impl World {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            width: config.arena_width,
            height: config.arena_height,
            obstacles: config.obstacles.iter().map(Rect::from).collect(),
            marks: config.marks.iter().map(Rect::from).collect(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// True for walls (anything outside the arena) and obstacle boxes
    pub fn is_occupied(&self, x: f32, y: f32) -> bool {
        if x < 0.0 || y < 0.0 || x > self.width || y > self.height {
            return true;
        }
        self.obstacles.iter().any(|r| r.contains(x, y))
    }

    /// True if the floor at (x, y) carries a mark
    pub fn mark_at(&self, x: f32, y: f32) -> bool {
        self.marks.iter().any(|r| r.contains(x, y))
    }

    /// Ray-cast from origin in direction, return distance to obstacle
    ///
    /// Returns max_range if no obstacle is hit.
    pub fn ray_cast(&self, ox: f32, oy: f32, angle: f32, max_range: f32) -> f32 {
        let dx = angle.cos() * RAY_STEP;
        let dy = angle.sin() * RAY_STEP;

        let mut x = ox;
        let mut y = oy;
        let mut distance = 0.0;

        while distance < max_range {
            x += dx;
            y += dy;
            distance += RAY_STEP;

            if self.is_occupied(x, y) {
                return distance;
            }
        }

        max_range
    }
}
