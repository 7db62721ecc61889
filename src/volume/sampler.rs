//! Disc point sampling for visibility volumes.
//!
//! Points are placed greedily: every new point is tried on a ring of radius
//! `2 * spacing` around an existing point, walking the existing points from
//! the most recently added one backwards. This is an approximate Poisson-disc
//! fill. It does not reach maximum packing and it stops silently when no
//! ring position around any point is free.

use std::f32::consts::PI;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::Vec3;
use super::config::{estimated_point_count, VisibilityVolumeConfig};

/// Ring positions tried around an existing point before giving up on it
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 36;

/// Upper bound on the up-front allocation for a point set
const INITIAL_CAPACITY: usize = 4096;

/// Source of randomness for sampling and shuffling.
///
/// Implemented for every [`rand::Rng`], so tests can pass a seeded
/// `StdRng` and get reproducible point sets.
pub trait RandomSource {
    /// Uniform float in `[min, max]`
    fn uniform_float(&mut self, min: f32, max: f32) -> f32;

    /// Shuffle values in place
    fn shuffle_indices(&mut self, values: &mut [u32]);
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform_float(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.gen_range(min..=max)
    }

    fn shuffle_indices(&mut self, values: &mut [u32]) {
        values.shuffle(self);
    }
}

/// Point sampler for one volume's disc
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointSampler {
    pub radius: f32,
    pub min_spacing: f32,
    pub vertical_variance: f32,
}

impl PointSampler {
    /// Create a sampler. `radius` and `min_spacing` must be positive.
    pub fn new(radius: f32, min_spacing: f32) -> Self {
        Self {
            radius,
            min_spacing,
            vertical_variance: 0.0,
        }
    }

    pub fn with_vertical_variance(mut self, variance: f32) -> Self {
        self.vertical_variance = variance;
        self
    }

    pub fn from_config(config: &VisibilityVolumeConfig) -> Self {
        Self::new(config.radius, config.distance_between_points)
            .with_vertical_variance(config.vertical_variance)
    }

    /// Generate local offsets inside the disc, jittered vertically if requested
    pub fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<Vec3> {
        let mut points = generate_points(self.radius, self.min_spacing, rng);
        if self.vertical_variance > 0.0 {
            for p in &mut points {
                p.z = rng.uniform_float(-self.vertical_variance, self.vertical_variance);
            }
        }
        points
    }
}

/// Fill a disc of `radius` with points at least `min_spacing` apart.
///
/// Returns a single origin point when fewer than two points would fit.
pub fn generate_points<R: RandomSource + ?Sized>(radius: f32, min_spacing: f32, rng: &mut R) -> Vec<Vec3> {
    let estimate = estimated_point_count(radius, min_spacing);
    let mut points = Vec::with_capacity((estimate as usize).min(INITIAL_CAPACITY));

    if estimate < 2 {
        points.push(Vec3::ZERO);
        return points;
    }

    let seed_angle = rng.uniform_float(-PI, PI);
    points.push(polar(seed_angle, radius - min_spacing));

    let spacing_sq = min_spacing * min_spacing;
    let radius_sq = radius * radius;

    let mut grew = true;
    while grew {
        grew = false;
        for i in (0..points.len()).rev() {
            if let Some(p) = try_place_around(points[i], min_spacing, spacing_sq, radius_sq, &points, rng) {
                points.push(p);
                grew = true;
                break;
            }
        }
    }

    points
}

/// Walk the ring around `src` and return the first admissible position
fn try_place_around<R: RandomSource + ?Sized>(
    src: Vec3,
    min_spacing: f32,
    spacing_sq: f32,
    radius_sq: f32,
    points: &[Vec3],
    rng: &mut R,
) -> Option<Vec3> {
    let step = 2.0 * PI / MAX_PLACEMENT_ATTEMPTS as f32;
    let mut angle = rng.uniform_float(-PI, PI);

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = src + polar(angle, 2.0 * min_spacing);
        if is_admissible(candidate, points, spacing_sq, radius_sq) {
            return Some(candidate);
        }
        angle += step;
    }
    None
}

/// Inside the disc and not closer than the spacing to any point (XY only)
fn is_admissible(candidate: Vec3, points: &[Vec3], spacing_sq: f32, radius_sq: f32) -> bool {
    if candidate.x * candidate.x + candidate.y * candidate.y > radius_sq {
        return false;
    }
    points.iter().all(|e| {
        let dx = e.x - candidate.x;
        let dy = e.y - candidate.y;
        dx * dx + dy * dy >= spacing_sq
    })
}

fn polar(angle: f32, distance: f32) -> Vec3 {
    Vec3::new(angle.cos() * distance, angle.sin() * distance, 0.0)
}
