//! Mass-spring spine simulation.
//!
//! The chain is a strict path of point masses along the x axis. Both endpoints
//! are pinned (zero inverse mass); interior points are pulled back toward rest
//! by Hookean springs and pushed around by audio-driven impulses. Integration
//! runs on a fixed sub-step with an accumulator so that the result depends only
//! on the total elapsed time, not on how the host splits it into frames.

use crate::constants::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

/// Tunable parameters for [`SpineSimulator`].
#[derive(Clone, Debug)]
pub struct SpineConfig {
    pub length: f32,
    pub count: usize,
    pub stiffness: f32,
    pub damping: f32,
    pub linear_damping: f32,
    pub mass: f32,
    /// Impulse magnitude per unit of audio level.
    pub force_gain: f32,
    /// How many neighbours on each side receive a share of an impulse.
    pub falloff_radius: usize,
    /// Scale applied to the x component of the random impulse direction.
    pub axial_jitter: f32,
    pub fixed_step: f64,
    pub max_substeps: u32,
    /// Speed limit enforced after every sub-step. Non-positive disables it.
    pub max_speed: f32,
}

impl Default for SpineConfig {
    fn default() -> Self {
        Self {
            length: SPINE_LENGTH,
            count: SPINE_POINTS,
            stiffness: SPRING_STIFFNESS,
            damping: SPRING_DAMPING,
            linear_damping: LINEAR_DAMPING,
            mass: POINT_MASS,
            force_gain: FORCE_GAIN,
            falloff_radius: FORCE_FALLOFF_RADIUS,
            axial_jitter: FORCE_AXIAL_JITTER,
            fixed_step: FIXED_STEP_SEC,
            max_substeps: MAX_SUBSTEPS,
            max_speed: MAX_POINT_SPEED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PointMass {
    pub position: Vec3,
    pub velocity: Vec3,
    pub inv_mass: f32,
    force: Vec3,
}

impl PointMass {
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// Hookean connector between chain points `a` and `a + 1`.
#[derive(Clone, Debug)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    /// Force acting on `b`; `a` receives the negation.
    fn force(&self, points: &[PointMass]) -> Vec3 {
        let pa = &points[self.a];
        let pb = &points[self.b];
        let r = pb.position - pa.position;
        let len = r.length();
        if len <= f32::EPSILON {
            return Vec3::ZERO;
        }
        let axis = r / len;
        let rel_vel = pb.velocity - pa.velocity;
        let magnitude = -self.stiffness * (len - self.rest_length) - self.damping * rel_vel.dot(axis);
        axis * magnitude
    }
}

pub struct SpineSimulator {
    pub config: SpineConfig,
    points: Vec<PointMass>,
    rest: Vec<Vec3>,
    springs: Vec<Spring>,
    step_size: f32,
    accumulator: f64,
    substeps_total: u64,
    rng: StdRng,
}

// Absorbs rounding when frame deltas sum to an exact multiple of the step.
const ACCUMULATOR_EPSILON: f64 = 1e-9;

impl SpineSimulator {
    pub fn new(config: SpineConfig, seed: u64) -> Self {
        let mut sim = Self {
            config,
            points: Vec::new(),
            rest: Vec::new(),
            springs: Vec::new(),
            step_size: 0.0,
            accumulator: 0.0,
            substeps_total: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        let (length, count) = (sim.config.length, sim.config.count);
        sim.initialize(length, count);
        sim
    }

    /// Rebuild the chain at rest spanning `[-length/2, length/2]`.
    ///
    /// `count` is kept within `2..=SPINE_POINTS`: at least one spring, and no
    /// more points than the shader-side spine array holds.
    pub fn initialize(&mut self, length: f32, count: usize) {
        let count = count.clamp(2, SPINE_POINTS);
        self.config.length = length;
        self.config.count = count;
        self.step_size = length / (count - 1) as f32;
        let half = length / 2.0;

        self.rest = (0..count)
            .map(|i| Vec3::new(-half + i as f32 * self.step_size, 0.0, 0.0))
            .collect();
        let interior_inv_mass = if self.config.mass > 0.0 { 1.0 / self.config.mass } else { 0.0 };
        self.points = self
            .rest
            .iter()
            .enumerate()
            .map(|(i, &position)| PointMass {
                position,
                velocity: Vec3::ZERO,
                inv_mass: if i == 0 || i == count - 1 { 0.0 } else { interior_inv_mass },
                force: Vec3::ZERO,
            })
            .collect();
        // Rest length is measured from the generated positions so an untouched
        // chain produces exactly zero spring force.
        self.springs = (1..count)
            .map(|i| Spring {
                a: i - 1,
                b: i,
                rest_length: (self.rest[i] - self.rest[i - 1]).length(),
                stiffness: self.config.stiffness,
                damping: self.config.damping,
            })
            .collect();
        self.accumulator = 0.0;
        self.substeps_total = 0;
        log::debug!("[spine] initialized {count} points over length {length}");
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    pub fn points(&self) -> &[PointMass] {
        &self.points
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest
    }

    /// Fixed sub-steps performed since the last `initialize`.
    pub fn substeps_total(&self) -> u64 {
        self.substeps_total
    }

    /// Nearest chain index for an axial coordinate, clamped to the chain.
    pub fn index_for_x(&self, x: f32) -> usize {
        let last = self.points.len().saturating_sub(1);
        if !x.is_finite() || self.step_size <= 0.0 {
            return 0;
        }
        let idx = ((x + self.config.length / 2.0) / self.step_size).round();
        idx.clamp(0.0, last as f32) as usize
    }

    /// Queue an audio-driven impulse at the chain point nearest `play_x`.
    ///
    /// Neighbours within the falloff radius receive `1 / (d + 1)` of it.
    /// Pinned points are skipped; a pinned centre makes the whole call a no-op.
    pub fn apply_force(&mut self, audio_level: f32, play_x: f32) {
        let center = self.index_for_x(play_x);
        if self.points[center].is_pinned() || !audio_level.is_finite() {
            return;
        }
        let magnitude = audio_level.max(0.0) * self.config.force_gain;
        let force = self.random_direction() * magnitude;

        let radius = self.config.falloff_radius;
        let mut targets: SmallVec<[(usize, f32); 5]> = SmallVec::new();
        targets.push((center, 1.0));
        for d in 1..=radius {
            let falloff = 1.0 / (d as f32 + 1.0);
            if let Some(left) = center.checked_sub(d) {
                targets.push((left, falloff));
            }
            if center + d < self.points.len() {
                targets.push((center + d, falloff));
            }
        }
        for (idx, share) in targets {
            let p = &mut self.points[idx];
            if !p.is_pinned() {
                p.force += force * share;
            }
        }
        log::trace!("[spine] impulse {magnitude:.1} at index {center}");
    }

    fn random_direction(&mut self) -> Vec3 {
        loop {
            let dir = Vec3::new(
                (self.rng.gen::<f32>() - 0.5) * self.config.axial_jitter,
                self.rng.gen::<f32>() - 0.5,
                self.rng.gen::<f32>() - 0.5,
            );
            if dir.length_squared() > 1e-6 {
                return dir.normalize();
            }
        }
    }

    /// Advance by `dt` seconds of wall-clock time. Returns the number of
    /// fixed sub-steps taken.
    ///
    /// Leftover time below one sub-step carries into the next call. When the
    /// sub-step cap is hit, whole steps still owed are dropped.
    pub fn step(&mut self, dt: f64) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }
        let fixed = self.config.fixed_step;
        let mut taken = 0;
        while self.accumulator + ACCUMULATOR_EPSILON >= fixed && taken < self.config.max_substeps {
            self.integrate(fixed as f32);
            self.accumulator = (self.accumulator - fixed).max(0.0);
            taken += 1;
        }
        if taken == self.config.max_substeps && self.accumulator >= fixed {
            self.accumulator %= fixed;
        }
        self.substeps_total += u64::from(taken);
        taken
    }

    fn integrate(&mut self, h: f32) {
        for i in 0..self.springs.len() {
            let spring = &self.springs[i];
            let f = spring.force(&self.points);
            let (a, b) = (spring.a, spring.b);
            self.points[a].force -= f;
            self.points[b].force += f;
        }

        let keep = (1.0 - self.config.linear_damping).clamp(0.0, 1.0).powf(h);
        let max_speed = self.config.max_speed;
        for p in &mut self.points {
            if p.is_pinned() {
                p.force = Vec3::ZERO;
                continue;
            }
            p.velocity *= keep;
            p.velocity += p.force * p.inv_mass * h;
            if max_speed > 0.0 {
                p.velocity = p.velocity.clamp_length_max(max_speed);
            }
            p.position += p.velocity * h;
            p.force = Vec3::ZERO;
        }
    }

    /// Snapshot of the current point positions, refreshed after every step.
    pub fn export_positions(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.position).collect()
    }
}
