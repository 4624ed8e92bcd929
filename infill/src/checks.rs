//! Plausibility checks run before the optimization starts.

use kinematics::speed_change_open;

use crate::input::parameters::Parameters;
use crate::input::scenario::Scenario;
use crate::{InfillError, InfillResult};

fn invalid<T>(msg: String) -> InfillResult<T> {
    Err(InfillError::InvalidArgument(msg))
}

fn max(xs: &[f64]) -> f64 {
    xs.iter().cloned().fold(std::f64::NEG_INFINITY, f64::max)
}

fn min(xs: &[f64]) -> f64 {
    xs.iter().cloned().fold(std::f64::INFINITY, f64::min)
}

/// Checks on the parameters as given in the file.
pub fn check_parameters(p :&Parameters) -> InfillResult<()> {
    if p.track.balises != 2 && p.track.balises != 3 {
        return invalid(format!("{} infill balise groups not supported", p.track.balises));
    }
    if p.track.balise_positions.len() < p.track.balises {
        return invalid(format!("{} balise positions given for {} balise groups",
                               p.track.balise_positions.len(), p.track.balises));
    }
    p.first_infill()?;
    if p.track.balise_group_distance < 0 {
        return invalid(format!("balise group distance negative ({} m)",
                               p.track.balise_group_distance));
    }
    if p.tech.steps <= 0 {
        return invalid(format!("step size not positive ({} m)", p.tech.steps));
    }
    if max(&p.train.deceleration.values) > 0.0 {
        return invalid("deceleration greater than 0".to_string());
    }
    if min(&p.train.acceleration.values) < 0.0 {
        return invalid("acceleration less than 0".to_string());
    }
    if p.train.min_cruise_time < 0.0 {
        return invalid(format!("minimum cruise time negative ({} s)", p.train.min_cruise_time));
    }
    if p.train.processing_time < 0.0 {
        return invalid(format!("processing time negative ({} s)", p.train.processing_time));
    }
    Ok(())
}

/// Checks on the derived quantities, including whether the train can stop
/// between the indication point and the end of authority.
pub fn check_scenario(s :&Scenario) -> InfillResult<()> {
    if s.deceleration.band_accels().any(|a| a > 0.0) {
        return invalid("braking too weak or downhill gradient too steep".to_string());
    }
    if s.acceleration.band_accels().any(|a| a < 0.0) {
        return invalid("traction too weak or uphill gradient too steep".to_string());
    }

    let stop = speed_change_open(s.train_speed, 0.0, &s.deceleration)?;
    if stop.distance > s.indication_point {
        return Err(InfillError::Unreachable {
            stopping_distance: stop.distance,
            indication_point: s.indication_point,
        });
    }
    Ok(())
}
