//! Two-stage grid search for the free infill balise group positions.
//!
//! Positions are integer metres before the end of authority. The "outer"
//! free group is the one next to the first (fixed) infill, the "inner" one
//! lies between the outer group and the target and exists only with three
//! infill balise groups.

use kinematics::Trajectory;
use log::*;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::composer::IntervalTimestamps;
use crate::input::parameters::{Parameters, Weighting};
use crate::input::scenario::Scenario;
use crate::{InfillError, InfillResult};

pub type Intervals = SmallVec<[f64; 3]>;

#[derive(Clone, Debug)]
pub struct SearchSpace {
    pub balises: usize,
    /// Minimum distance between balise groups.
    pub spacing: i64,
    pub first_infill: i64,
    pub indication_point: i64,
    pub pinned_outer: Option<i64>,
    pub pinned_inner: Option<i64>,
    pub steps: i64,
    pub weighting: Weighting,
}

/// Search window around a center position, both ends included.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub center: i64,
    pub envelope: i64,
}

impl SearchSpace {
    pub fn from_parameters(p :&Parameters) -> InfillResult<SearchSpace> {
        Ok(SearchSpace {
            balises: p.track.balises,
            spacing: p.track.balise_group_distance,
            first_infill: p.first_infill()?,
            indication_point: p.train.indication_point,
            pinned_outer: p.second_infill(),
            pinned_inner: p.third_infill(),
            steps: p.tech.steps,
            weighting: p.tech.weighting,
        })
    }

    /// All free positions are given, so one unit step run is enough.
    pub fn fully_pinned(&self) -> bool {
        match self.balises {
            2 => self.pinned_outer.is_some(),
            _ => self.pinned_outer.is_some() && self.pinned_inner.is_some(),
        }
    }

    fn clamp(lo: i64, hi: i64, window: Option<Window>) -> (i64, i64) {
        match window {
            Some(w) => ((w.center - w.envelope).max(lo), (w.center + w.envelope).min(hi)),
            None => (lo, hi),
        }
    }

    /// Candidate range for the outer free group, both ends included.
    pub fn outer_range(&self, window: Option<Window>) -> (i64, i64) {
        if let Some(p) = self.pinned_outer {
            return (p, p);
        }
        let lo = 1 + self.spacing;
        let hi = self.indication_point.min(self.first_infill) - self.spacing - 1;
        SearchSpace::clamp(lo, hi, window)
    }

    /// Candidate range for the inner free group behind `outer`.
    pub fn inner_range(&self, outer: i64, window: Option<Window>) -> (i64, i64) {
        if let Some(p) = self.pinned_inner {
            return (p, p);
        }
        SearchSpace::clamp(1, outer - self.spacing, window)
    }
}

/// Mean of the interval deltas weighted by `weights`.
pub fn weighted_mean(deltas: &[f64], weights: &[f64]) -> InfillResult<f64> {
    let sum: f64 = weights.iter().sum();
    if !(sum > 0.0) || !sum.is_finite() {
        return Err(InfillError::InvalidState(format!("weights {:?} do not add up to a positive value",
                                                     weights)));
    }
    Ok(deltas.iter().zip(weights.iter()).map(|(d, w)| d * w).sum::<f64>() / sum)
}

/// Interval weights, ordered from the target outwards like the deltas.
pub fn weights(weighting: Weighting, stamps: &IntervalTimestamps, first_infill: i64,
               outer: i64, inner: Option<i64>) -> Intervals {
    match weighting {
        Weighting::Time => stamps.interval_times(),
        Weighting::Distance => {
            let mut markers: SmallVec<[i64; 4]> = SmallVec::new();
            markers.push(0);
            markers.extend(inner);
            markers.push(outer);
            markers.push(first_infill);
            markers.windows(2).map(|w| (w[1] - w[0]) as f64).collect()
        }
        Weighting::Equal => {
            let n = if inner.is_some() { 3 } else { 2 };
            SmallVec::from_elem(1.0, n)
        }
    }
}

/// Loss of every explored (outer, inner) pair.
#[derive(Clone, Debug, Default)]
pub struct LossSurface {
    values: BTreeMap<(i64, i64), f64>,
}

impl LossSurface {
    pub fn new() -> LossSurface {
        LossSurface { values: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn set(&mut self, outer: i64, inner: i64, loss: f64) {
        self.values.insert((outer, inner), loss);
    }

    pub fn get(&self, outer: i64, inner: i64) -> Option<f64> {
        self.values.get(&(outer, inner)).cloned()
    }

    /// Explored pair with the smallest loss.
    pub fn min(&self) -> Option<((i64, i64), f64)> {
        self.values.iter()
            .min_by_key(|(_, x)| OrderedFloat(**x))
            .map(|(k, x)| (*k, *x))
    }

    /// Rows of `outer inner loss`, ordered by outer then inner position.
    pub fn rows<'a>(&'a self) -> impl Iterator<Item = (i64, i64, f64)> + 'a {
        self.values.iter().map(|(&(outer, inner), &loss)| (outer, inner, loss))
    }
}

#[derive(Clone, Debug)]
pub struct Candidate {
    pub outer: i64,
    pub inner: Option<i64>,
    pub loss: f64,
    /// Additional running time per interval, from the target outwards.
    pub deltas: Intervals,
    pub weights: Intervals,
    pub outer_trajectory: Trajectory,
    pub inner_trajectory: Option<Trajectory>,
}

#[derive(Clone, Debug)]
pub struct OptimizationState {
    pub best_loss: f64,
    pub best: Option<Candidate>,
    pub loss_surface: Option<LossSurface>,
    /// Upgrade at the first infill only; the unrestricted reference run.
    pub reference: Trajectory,
    pub target: Trajectory,
    pub evaluated: usize,
}

impl OptimizationState {
    /// Keeps the candidate if it is at least as good as the best so far.
    /// Among equal losses the last one evaluated wins.
    fn update(&mut self, candidate: Candidate) -> InfillResult<()> {
        if candidate.loss < 0.0 {
            return Err(InfillError::InvalidState(format!(
                        "additional running time negative ({} s)", candidate.loss)));
        }
        self.evaluated += 1;
        if candidate.loss <= self.best_loss {
            self.best_loss = candidate.loss;
            self.best = Some(candidate);
        }
        Ok(())
    }
}

/// Final placement of the infill balise groups.
#[derive(Clone, Debug)]
pub struct Placement {
    /// All infill positions including the first one, largest first.
    pub positions: SmallVec<[i64; 3]>,
    pub loss: f64,
    /// Best loss of the coarse stage, if one was run.
    pub coarse_loss: Option<f64>,
    pub best: Candidate,
    pub reference: Trajectory,
    pub target: Trajectory,
    pub loss_surface: Option<LossSurface>,
}

pub struct Optimizer<'a> {
    scenario: &'a Scenario,
    space: &'a SearchSpace,
}

impl<'a> Optimizer<'a> {
    pub fn new(scenario :&'a Scenario, space :&'a SearchSpace) -> Optimizer<'a> {
        Optimizer { scenario, space }
    }

    fn evaluate(&self, stamps: &mut IntervalTimestamps, reference: &Trajectory,
                target: &Trajectory, outer: i64, inner: Option<i64>,
                outer_trajectory: &Trajectory) -> InfillResult<Candidate> {
        let delta_target = target.time - reference.time;
        let delta_outer = outer_trajectory.time - reference.time;

        let mut deltas: Intervals = SmallVec::new();
        deltas.push(delta_target);
        let inner_trajectory = match inner {
            Some(d) => {
                let traj = self.scenario.infill_in_advance_of_ip(d, target.distance, 3, stamps)?;
                let delta_inner = traj.time - reference.time;
                debug!("delta inner: {:.2} s", delta_inner);
                deltas.push(delta_inner);
                Some(traj)
            }
            None => None,
        };
        deltas.push(delta_outer);

        let weights = weights(self.space.weighting, stamps, self.space.first_infill, outer, inner);
        let loss = weighted_mean(&deltas, &weights)?;

        match inner {
            Some(d) => debug!("positions {} m & {} m -> weighted additional running time {:.2} s",
                              d, outer, loss),
            None => debug!("position {} m -> weighted additional running time {:.2} s",
                           outer, loss),
        }

        Ok(Candidate {
            outer,
            inner,
            loss,
            deltas,
            weights,
            outer_trajectory: outer_trajectory.clone(),
            inner_trajectory,
        })
    }

    /// Evaluates every candidate on a grid of the given step size. The
    /// windows restrict the search around an earlier optimum.
    pub fn search(&self, step: i64, outer_window: Option<Window>, inner_window: Option<Window>)
        -> InfillResult<OptimizationState> {
        if step <= 0 {
            return Err(InfillError::InvalidArgument(format!("step size not positive ({} m)", step)));
        }
        let s = self.scenario;
        let mut stamps = IntervalTimestamps::new(self.space.balises);

        let target = s.infill_at_target(s.first_infill, &mut stamps)?;
        let reference = if s.indication_point > s.first_infill {
            s.infill_in_advance_of_ip(self.space.first_infill, target.distance, 1, &mut stamps)?
        } else {
            s.infill_in_rear_of_ip(target.distance, s.train_speed, &mut stamps)?
        };
        debug!("delta target: {:.2} s", target.time - reference.time);

        let with_surface = step == 1 && self.space.balises == 3;
        let mut state = OptimizationState {
            best_loss: std::f64::INFINITY,
            best: None,
            loss_surface: if with_surface {
                Some(LossSurface::new())
            } else {
                None
            },
            reference,
            target,
            evaluated: 0,
        };

        let (outer_lo, outer_hi) = self.space.outer_range(outer_window);
        for outer in (outer_lo..=outer_hi).step_by(step as usize) {
            let outer_trajectory = s.infill_in_advance_of_ip(outer, state.target.distance, 2,
                                                             &mut stamps)?;
            debug!("delta outer: {:.2} s", outer_trajectory.time - state.reference.time);

            if self.space.balises == 2 {
                let c = self.evaluate(&mut stamps, &state.reference, &state.target, outer, None,
                                      &outer_trajectory)?;
                state.update(c)?;
                continue;
            }

            let (inner_lo, inner_hi) = self.space.inner_range(outer, inner_window);
            for inner in (inner_lo..=inner_hi).step_by(step as usize) {
                let c = self.evaluate(&mut stamps, &state.reference, &state.target, outer,
                                      Some(inner), &outer_trajectory)?;
                if let Some(ref mut surface) = state.loss_surface {
                    surface.set(outer, inner, c.loss);
                }
                state.update(c)?;
            }
        }

        if state.best.is_none() {
            return Err(InfillError::InvalidArgument(format!(
                        "no candidate positions between {} m and {} m", outer_lo, outer_hi)));
        }
        Ok(state)
    }

    /// Coarse search at the configured step size followed by a unit step
    /// search around its optimum, or a single unit step run if every
    /// position is given.
    pub fn run(&self) -> InfillResult<Placement> {
        let steps = self.space.steps;
        let (state, coarse_loss) = if self.space.fully_pinned() {
            info!("Run 1 of 1");
            (self.search(1, None, None)?, None)
        } else {
            info!("Run 1 of 2");
            let coarse = self.search(steps, None, None)?;
            let (outer, inner) = match coarse.best {
                Some(ref c) => (c.outer, c.inner),
                None => return Err(InfillError::InvalidState("no coarse optimum".to_string())),
            };
            info!("Coarse optimum {:.2} s, {} evaluations", coarse.best_loss, coarse.evaluated);
            info!("Run 2 of 2");
            let window = |center| Window { center, envelope: steps };
            (self.search(1, Some(window(outer)), inner.map(window))?, Some(coarse.best_loss))
        };

        let OptimizationState { best_loss, best, loss_surface, reference, target, .. } = state;
        let best = best.ok_or_else(|| InfillError::InvalidState("no optimum".to_string()))?;

        let mut positions: SmallVec<[i64; 3]> = SmallVec::new();
        positions.push(self.space.first_infill);
        positions.push(best.outer);
        positions.extend(best.inner);
        positions.sort_by(|a, b| b.cmp(a));

        match best.inner {
            Some(inner) => info!("Min. weighted additional running time: {:.2} s at {} m, {} m & {} m",
                                 best_loss, inner, best.outer, self.space.first_infill),
            None => info!("Min. weighted additional running time: {:.2} s at {} m & {} m",
                          best_loss, best.outer, self.space.first_infill),
        }

        Ok(Placement {
            positions,
            loss: best_loss,
            coarse_loss,
            best,
            reference,
            target,
            loss_surface,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(outer: i64, loss: f64) -> Candidate {
        Candidate {
            outer,
            inner: None,
            loss,
            deltas: SmallVec::from_slice(&[loss, loss]),
            weights: SmallVec::from_slice(&[1.0, 1.0]),
            outer_trajectory: Trajectory::new(10.0),
            inner_trajectory: None,
        }
    }

    fn state() -> OptimizationState {
        OptimizationState {
            best_loss: std::f64::INFINITY,
            best: None,
            loss_surface: None,
            reference: Trajectory::new(10.0),
            target: Trajectory::new(10.0),
            evaluated: 0,
        }
    }

    #[test]
    fn last_equal_candidate_wins() {
        let mut s = state();
        s.update(candidate(100, 3.0)).unwrap();
        s.update(candidate(200, 2.0)).unwrap();
        s.update(candidate(300, 2.5)).unwrap();
        s.update(candidate(400, 2.0)).unwrap();
        assert_eq!(s.best.as_ref().unwrap().outer, 400);
        assert_eq!(s.best_loss, 2.0);
        assert_eq!(s.evaluated, 4);
    }

    #[test]
    fn negative_loss_rejected() {
        let mut s = state();
        match s.update(candidate(100, -0.5)) {
            Err(InfillError::InvalidState(_)) => {},
            x => panic!("unexpected {:?}", x),
        }
        assert!(s.best.is_none());
    }

    #[test]
    fn loss_surface() {
        let mut surface = LossSurface::new();
        assert!(surface.min().is_none());
        surface.set(7, 1, 1.5);
        surface.set(5, 2, 3.0);
        surface.set(5, 1, 2.0);
        surface.set(5, 2, 2.5);
        assert_eq!(surface.len(), 3);
        assert_eq!(surface.get(5, 2), Some(2.5));
        assert_eq!(surface.get(5, 3), None);
        assert_eq!(surface.min(), Some(((7, 1), 1.5)));
        assert_eq!(surface.rows().collect::<Vec<_>>(),
                   vec![(5, 1, 2.0), (5, 2, 2.5), (7, 1, 1.5)]);
    }
}
