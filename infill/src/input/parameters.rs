//! Parameter file model.
//!
//! Speeds are given in km/h, distances and positions in m before the end of
//! authority, times in s and the gradient in per mille.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{InfillError, InfillResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weighting {
    /// Intervals weighted by their running time.
    Time,
    /// Intervals weighted by their length.
    Distance,
    Equal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub track: Track,
    pub train: Train,
    pub tech: Tech,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub line_speed: f64,
    pub release_speed: f64,
    pub gradient: f64,
    pub balises: usize,
    /// Minimum distance between two balise groups.
    pub balise_group_distance: i64,
    /// Fixed positions, largest first. Zero marks a free position.
    pub balise_positions: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepFunction {
    pub steps: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub speed: f64,
    pub deceleration: StepFunction,
    pub acceleration: StepFunction,
    /// Rotating mass supplement in percent.
    pub rotating_mass: f64,
    pub indication_point: i64,
    pub min_cruise_time: f64,
    pub processing_time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tech {
    pub steps: i64,
    pub weighting: Weighting,
    /// Presentation settings, passed through untouched.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Parameters {
    pub fn from_json(input: &str) -> InfillResult<Parameters> {
        let mut params: Parameters = serde_json::from_str(input)
            .map_err(|e| InfillError::Config(format!("{}", e)))?;
        params.track.balise_positions.sort_by(|a, b| b.cmp(a));
        Ok(params)
    }

    fn position(&self, idx: usize) -> Option<i64> {
        self.track.balise_positions.get(idx).cloned().filter(|p| *p > 0)
    }

    /// Fixed infill balise group farthest from the end of authority.
    pub fn first_infill(&self) -> InfillResult<i64> {
        self.position(0).ok_or_else(|| InfillError::Config(
                "no position for the first infill balise group".to_string()))
    }

    /// Pre-set position of the free balise group next to the first infill.
    pub fn second_infill(&self) -> Option<i64> {
        self.position(1)
    }

    /// Pre-set position of the third free balise group, if there is one.
    pub fn third_infill(&self) -> Option<i64> {
        if self.track.balises > 2 { self.position(2) } else { None }
    }
}
