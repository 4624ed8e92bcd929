//! Placement of infill balise groups between an indication point and the
//! end of authority.

#[macro_use]
extern crate failure_derive;

pub mod input;
pub mod checks;
pub mod composer;
pub mod optimize;
pub mod output;


use kinematics::KinematicsError;
use log::*;
use std::path::Path;

use crate::input::parameters::Parameters;
use crate::input::scenario::Scenario;
use crate::optimize::{Optimizer, Placement, SearchSpace};

#[derive(Debug, Fail)]
pub enum InfillError {
    #[fail(display = "invalid argument: {}", _0)]
    InvalidArgument(String),
    #[fail(display = "invalid state: {}", _0)]
    InvalidState(String),
    #[fail(display = "braking to standstill needs {:.2} m but the indication point is {} m before the end of authority",
           stopping_distance, indication_point)]
    Unreachable {
        stopping_distance: f64,
        indication_point: f64,
    },
    #[fail(display = "parameters: {}", _0)]
    Config(String),
}

impl From<KinematicsError> for InfillError {
    fn from(e: KinematicsError) -> InfillError {
        InfillError::InvalidArgument(format!("{}", e))
    }
}

pub type InfillResult<T> = Result<T, InfillError>;
pub type AppResult<T> = Result<T, failure::Error>;

pub(crate) fn non_negative(quantity: &str, value: f64, unit: &str) -> InfillResult<f64> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(InfillError::InvalidArgument(
                format!("value for '{}' negative ({} {})", quantity, value, unit)))
    }
}

pub fn read_file(f :&Path) -> AppResult<String> {
  use std::fs::File;
  use std::io::prelude::*;
  use std::io::BufReader;

  let file = File::open(f)?;
  let mut file = BufReader::new(&file);
  let mut contents = String::new();
  file.read_to_string(&mut contents)?;
  Ok(contents)
}

pub fn get_parameters(f :&Path) -> AppResult<Parameters> {
    let contents = read_file(f)?;
    let params = Parameters::from_json(&contents)?;
    Ok(params)
}

/// Runs the plausibility checks and the full optimization for a parameter set.
pub fn plan(params :&Parameters) -> InfillResult<Placement> {
    checks::check_parameters(params)?;
    let scenario = Scenario::from_parameters(params)?;
    checks::check_scenario(&scenario)?;
    let space = SearchSpace::from_parameters(params)?;

    info!("Speed: {:.2} km/h", scenario.train_speed * 3.6);
    info!("Weighting: {:?}", space.weighting);
    if scenario.indication_point > scenario.first_infill {
        info!("Indication point is passed before the first infill balise group");
    }

    Optimizer::new(&scenario, &space).run()
}
