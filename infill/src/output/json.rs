use failure::Error;
use kinematics::Trajectory;
use serde::Serialize;
use serde_json::json;
use std::io;

use crate::input::parameters::Parameters;
use crate::optimize::Placement;

#[derive(Serialize, Debug, PartialEq)]
pub struct MarkantPoint {
    /// m
    pub distance: f64,
    /// km/h
    pub speed: f64,
    /// m/s², absent on the last point
    pub acceleration: Option<f64>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn markant_points(t: &Trajectory) -> Vec<MarkantPoint> {
    t.steps().map(|s| MarkantPoint {
        distance: round2(s.x),
        speed: round2(s.v * 3.6),
        acceleration: s.acc,
    }).collect()
}

/// Writes the parameters together with the results. The scenario
/// trajectories are included if `trajectories` is set.
pub fn json_results<W: io::Write>(params: &Parameters,
                                  placement: &Placement,
                                  trajectories: bool,
                                  f: &mut W)
                                  -> Result<(), Error> {
    let mut output = serde_json::to_value(params)?;
    output["results"] = json!({
        "infill_positions": placement.positions.to_vec(),
        "additional_runtime": round2(placement.loss),
    });

    if trajectories {
        let best = &placement.best;
        output["trajectories"] = json!({
            "reference": markant_points(&placement.reference),
            "target": markant_points(&placement.target),
            "outer": markant_points(&best.outer_trajectory),
            "inner": best.inner_trajectory.as_ref().map(markant_points),
        });
    }

    serde_json::to_writer_pretty(&mut *f, &output)?;
    writeln!(f)?;
    Ok(())
}
