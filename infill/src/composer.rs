//! Scenario trajectories: the train approaches the indication point at
//! line speed, brakes towards the release speed and accelerates back to line
//! speed once its authority is extended by a balise group.

use kinematics::{cruise, dwell, speed_change_distance_limited, speed_change_open,
                 speed_change_time_limited, Trajectory};
use log::*;
use smallvec::SmallVec;

use crate::input::scenario::Scenario;
use crate::{non_negative, InfillError, InfillResult};

/// Time at which the train passes each balise group.
///
/// Slot 0 is the origin of the evaluated stretch, slot 1 the first infill
/// balise group, then the free groups from the first infill towards the
/// target, and the last slot is the target balise group at the end of
/// authority.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalTimestamps {
    times: SmallVec<[f64; 5]>,
}

impl IntervalTimestamps {
    pub fn new(balises: usize) -> IntervalTimestamps {
        IntervalTimestamps { times: SmallVec::from_elem(0.0, balises + 2) }
    }

    pub fn record(&mut self, slot: usize, time: f64) {
        self.times[slot] = time;
    }

    pub fn get(&self, slot: usize) -> f64 {
        self.times[slot]
    }

    pub fn target_slot(&self) -> usize {
        self.times.len() - 1
    }

    /// Running times of the intervals between consecutive balise groups,
    /// starting at the target and ending at the first infill.
    pub fn interval_times(&self) -> SmallVec<[f64; 3]> {
        (2..self.times.len()).rev()
            .map(|i| self.times[i] - self.times[i - 1])
            .collect()
    }
}

impl Scenario {
    /// Authority is extended only by the balise group at the end of
    /// authority: brake to release speed, hold it for the minimum cruise
    /// time, then accelerate back.
    pub fn infill_at_target(&self, distance_limit: f64, stamps: &mut IntervalTimestamps)
        -> InfillResult<Trajectory> {
        non_negative("distance_limit", distance_limit, "m")?;

        let v = self.train_speed;
        let ip = self.indication_point;
        let (s_approach, t_approach) = cruise(self.origin_target - ip, v, 0.0)?;
        let decel = speed_change_open(v, self.release_speed, &self.deceleration)?;
        if decel.distance > distance_limit {
            return Err(InfillError::InvalidArgument(format!(
                        "release speed not reachable within {} m (needs {:.2} m)",
                        distance_limit, decel.distance)));
        }
        let (s_release, t_release) = cruise(ip - decel.distance, self.release_speed,
                                            self.min_cruise_time)?;
        let (mut s_process, mut t_process) = dwell(self.release_speed, self.processing_time)?;
        let accel = speed_change_open(self.release_speed, v, &self.acceleration)?;
        // The hold at release speed already covers the processing time.
        if decel.distance + s_release - ip >= s_process {
            s_process = 0.0;
            t_process = 0.0;
        }

        let mut traj = Trajectory::new(v);
        traj.hold(s_approach, t_approach);
        traj.append(&decel);
        traj.hold(s_release, t_release);
        traj.hold(s_process, t_process);
        traj.append(&accel);

        stamps.record(stamps.target_slot(), t_approach + decel.time + t_release);

        debug!("target: s_approach={:.2} s_decel={:.2} s_release={:.2} s_process={:.2} s_accel={:.2} s_total={:.2} m",
               s_approach, decel.distance, s_release, s_process, accel.distance, traj.distance);
        debug!("target: t_approach={:.2} t_decel={:.2} t_release={:.2} t_process={:.2} t_accel={:.2} t_total={:.2} s",
               t_approach, decel.time, t_release, t_process, accel.time, traj.time);
        Ok(traj)
    }

    /// The restriction is lifted before the indication point is reached, so
    /// the train runs at constant speed.
    pub fn infill_in_rear_of_ip(&self, target_distance: f64, speed: f64,
                                stamps: &mut IntervalTimestamps)
        -> InfillResult<Trajectory> {
        non_negative("target_distance", target_distance, "m")?;
        non_negative("speed", speed, "m/s")?;

        let (s_total, t_total) = cruise(target_distance, speed, 0.0)?;
        let mut traj = Trajectory::new(speed);
        traj.hold(s_total, t_total);

        let (_, t_first) = cruise(self.origin_target - self.first_infill, speed, 0.0)?;
        stamps.record(1, t_first);

        debug!("in rear of IP: s_total={:.2} m t_total={:.2} s", s_total, t_total);
        Ok(traj)
    }

    /// The train starts braking at the indication point and receives the
    /// extension at the balise group `position` m before the end of
    /// authority. After the processing time it holds its speed for what
    /// remains of the minimum cruise time, accelerates back to line speed
    /// and runs on until `target_distance`.
    pub fn infill_in_advance_of_ip(&self, position: i64, target_distance: f64, slot: usize,
                                   stamps: &mut IntervalTimestamps)
        -> InfillResult<Trajectory> {
        non_negative("position", position as f64, "m")?;
        non_negative("target_distance", target_distance, "m")?;

        let v = self.train_speed;
        let ip = self.indication_point;
        let position = position as f64;

        let (s_approach, t_approach) = cruise(self.origin_target - ip, v, 0.0)?;
        let decel = speed_change_distance_limited(v, self.release_speed, &self.deceleration,
                                                  ip - position)?;
        let infill_speed = decel.exit_speed.unwrap_or(self.release_speed);
        let process = speed_change_time_limited(infill_speed, self.release_speed,
                                                &self.deceleration, self.processing_time,
                                                self.processing_time)?;
        let process_speed = process.exit_speed.unwrap_or(infill_speed);
        let cruise_time = process.cruise_time.unwrap_or(0.0);
        let (s_release, t_release) = cruise(
            (ip - position - decel.distance - process.distance).max(0.0),
            process_speed,
            (self.min_cruise_time - cruise_time).max(0.0))?;
        let accel = speed_change_open(process_speed, v, &self.acceleration)?;
        let (s_cruise, t_cruise) = cruise(target_distance - s_approach - decel.distance
                                          - process.distance - s_release - accel.distance,
                                          v, 0.0)?;

        let mut traj = Trajectory::new(v);
        traj.hold(s_approach, t_approach);
        traj.append(&decel);
        traj.append(&process);
        traj.hold(s_release, t_release);
        traj.append(&accel);
        traj.hold(s_cruise, t_cruise);

        stamps.record(slot, t_approach + decel.time);

        debug!("infill at {} m: {:.2} km/h at infill, {:.2} km/h after processing",
               position, infill_speed * 3.6, process_speed * 3.6);
        debug!("infill at {} m: s_approach={:.2} s_decel={:.2} s_process={:.2} s_release={:.2} s_accel={:.2} s_cruise={:.2} m",
               position, s_approach, decel.distance, process.distance, s_release,
               accel.distance, s_cruise);
        debug!("infill at {} m: t_approach={:.2} t_decel={:.2} t_process={:.2} t_release={:.2} t_accel={:.2} t_cruise={:.2} t_total={:.2} s",
               position, t_approach, decel.time, process.time, t_release, accel.time,
               t_cruise, traj.time);
        Ok(traj)
    }
}
