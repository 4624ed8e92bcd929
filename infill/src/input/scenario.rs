use kinematics::AccelerationProfile;

use crate::input::parameters::Parameters;
use crate::InfillResult;

/// Physical quantities of one optimization run, converted to SI units and
/// corrected for the gradient. Built once and only read afterwards.
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Lower of line speed and train speed, m/s.
    pub train_speed: f64,
    pub release_speed: f64,
    pub deceleration: AccelerationProfile,
    pub acceleration: AccelerationProfile,
    pub indication_point: f64,
    pub first_infill: f64,
    pub min_cruise_time: f64,
    pub processing_time: f64,
    /// Length of the evaluated stretch, from its origin to the end of authority.
    pub origin_target: f64,
}

/// Evaluation window rounded up to whole 250 m.
pub fn evaluation_window(first_infill: f64, indication_point: f64) -> f64 {
    ((first_infill.max(indication_point) + 1.0) / 250.0).ceil() * 250.0
}

impl Scenario {
    pub fn from_parameters(p :&Parameters) -> InfillResult<Scenario> {
        let gradient = p.track.gradient;
        let rotating_mass = p.train.rotating_mass;
        let deceleration = AccelerationProfile::from_kph(&p.train.deceleration.steps,
                                                         &p.train.deceleration.values)?
            .with_gradient(gradient, rotating_mass);
        let acceleration = AccelerationProfile::from_kph(&p.train.acceleration.steps,
                                                         &p.train.acceleration.values)?
            .with_gradient(gradient, rotating_mass);

        let first_infill = p.first_infill()? as f64;
        let indication_point = p.train.indication_point as f64;

        Ok(Scenario {
            train_speed: p.track.line_speed.min(p.train.speed) / 3.6,
            release_speed: p.track.release_speed / 3.6,
            deceleration,
            acceleration,
            indication_point,
            first_infill,
            min_cruise_time: p.train.min_cruise_time,
            processing_time: p.train.processing_time,
            origin_target: evaluation_window(first_infill, indication_point),
        })
    }
}
