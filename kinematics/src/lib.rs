//! Train movement under piecewise constant acceleration limits.
//!
//! Speeds are in m/s, distances in m, times in s and accelerations in m/s².

#[macro_use]
extern crate failure_derive;

pub mod profile;
pub mod dynamics;
pub mod speedchange;
pub mod trajectory;

#[cfg(test)]
mod tests;

pub use crate::dynamics::{cruise, dwell};
pub use crate::profile::{AccelerationProfile, ProfileStep};
pub use crate::speedchange::{speed_change_open, speed_change_distance_limited,
                             speed_change_time_limited};
pub use crate::trajectory::{DistanceVelocity, MovementStep, Trajectory};

#[derive(Debug, Fail, PartialEq)]
pub enum KinematicsError {
    #[fail(display = "invalid value for '{}': {} {}", quantity, value, unit)]
    InvalidArgument {
        quantity: &'static str,
        value: f64,
        unit: &'static str,
    },
    #[fail(display = "invalid acceleration profile: {}", _0)]
    InvalidProfile(String),
}

pub type KinematicsResult<T> = Result<T, KinematicsError>;

/// Rejects negative (and NaN) physical quantities.
pub(crate) fn non_negative(quantity: &'static str, value: f64, unit: &'static str)
    -> KinematicsResult<f64> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(KinematicsError::InvalidArgument { quantity, value, unit })
    }
}
