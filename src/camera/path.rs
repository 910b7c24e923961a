//! Closed Catmull-Rom path for cinematic camera moves

use bevy::math::Vec3;

/// Smooth closed curve through ordered control points, with a wrapping
/// progress scalar in [0, 1)
#[derive(Debug, Clone, PartialEq)]
pub struct CinematicPath {
    points: Vec<Vec3>,
    progress: f32,
}

impl CinematicPath {
    /// Needs at least two control points
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        (points.len() >= 2).then_some(Self {
            points,
            progress: 0.0,
        })
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Advance progress, wrapping back into [0, 1)
    pub fn advance(&mut self, amount: f32) {
        self.progress = (self.progress + amount).rem_euclid(1.0);
        if self.progress >= 1.0 {
            self.progress = 0.0;
        }
    }

    /// Position on the curve at `t` (wrapped into [0, 1))
    pub fn sample(&self, t: f32) -> Vec3 {
        let n = self.points.len();
        let scaled = t.rem_euclid(1.0) * n as f32;
        let segment = (scaled.floor() as usize).min(n - 1);
        let local = scaled - segment as f32;

        let p0 = self.points[(segment + n - 1) % n];
        let p1 = self.points[segment];
        let p2 = self.points[(segment + 1) % n];
        let p3 = self.points[(segment + 2) % n];
        catmull_rom(p0, p1, p2, p3, local)
    }
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
