use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::{KinematicsError, KinematicsResult};

/// Gravitational acceleration in m/s².
pub const G: f64 = 9.81;

/// One band of a step acceleration function.
///
/// `accel` applies to speeds in the band ending at `threshold`, i.e. between
/// the previous step's threshold and this one. The first step only marks
/// the lowest speed of the profile and its acceleration is a placeholder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProfileStep {
    pub threshold: f64,
    pub accel: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Accelerate,
    Decelerate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccelerationProfile {
    steps: SmallVec<[ProfileStep; 8]>,
}

impl AccelerationProfile {
    /// Builds a profile from `(threshold, accel)` pairs. Thresholds must be
    /// strictly increasing.
    pub fn new<I>(pairs: I) -> KinematicsResult<AccelerationProfile>
        where I: IntoIterator<Item = (f64, f64)>
    {
        let steps = pairs.into_iter()
            .map(|(threshold, accel)| ProfileStep { threshold, accel })
            .collect::<SmallVec<[ProfileStep; 8]>>();

        if steps.is_empty() {
            return Err(KinematicsError::InvalidProfile("no steps".to_string()));
        }
        for s in steps.iter() {
            if !s.threshold.is_finite() || !s.accel.is_finite() {
                return Err(KinematicsError::InvalidProfile(
                        format!("non-finite step ({}, {})", s.threshold, s.accel)));
            }
        }
        for w in steps.windows(2) {
            if !(w[0].threshold < w[1].threshold) {
                return Err(KinematicsError::InvalidProfile(
                        format!("thresholds not strictly increasing at {} m/s", w[1].threshold)));
            }
        }

        Ok(AccelerationProfile { steps })
    }

    /// Builds a profile from the parallel speed/value lists used in
    /// parameter files. Speeds are given in km/h and converted to m/s.
    pub fn from_kph(speeds: &[f64], values: &[f64]) -> KinematicsResult<AccelerationProfile> {
        if speeds.len() != values.len() {
            return Err(KinematicsError::InvalidProfile(
                    format!("{} speeds but {} values", speeds.len(), values.len())));
        }
        AccelerationProfile::new(speeds.iter().zip(values.iter())
                                 .map(|(v, a)| (v / 3.6, *a)))
    }

    /// Corrects every band (not the index-0 placeholder) for the track
    /// gradient in per mille, taking rotating masses into account.
    pub fn with_gradient(&self, gradient: f64, rotating_mass: f64) -> AccelerationProfile {
        let correction = G / (1.0 + rotating_mass / 100.0) * gradient / 1000.0;
        let mut steps = self.steps.clone();
        for s in steps.iter_mut().skip(1) {
            s.accel -= correction;
        }
        AccelerationProfile { steps }
    }

    pub fn steps(&self) -> &[ProfileStep] {
        &self.steps
    }

    pub fn max_speed(&self) -> f64 {
        self.steps[self.steps.len() - 1].threshold
    }

    /// Acceleration values of all bands, placeholder excluded.
    pub fn band_accels<'a>(&'a self) -> impl Iterator<Item = f64> + 'a {
        self.steps.iter().skip(1).map(|s| s.accel)
    }

    /// Index of the step whose band contains `speed` when moving in the
    /// given direction. Accelerating picks the first threshold above the
    /// speed, decelerating the first threshold at or above it.
    pub fn segment(&self, speed: f64, direction: Direction) -> usize {
        let key = OrderedFloat(speed);
        match self.steps.binary_search_by_key(&key, |s| OrderedFloat(s.threshold)) {
            Ok(i) => match direction {
                Direction::Accelerate => i + 1,
                Direction::Decelerate => i,
            },
            Err(i) => i,
        }
    }
}
