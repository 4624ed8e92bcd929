//! Speed changes through an acceleration profile: unrestricted, bounded by
//! a distance, or bounded by a time.

use log::trace;

use crate::dynamics::{dwell, plan_accel_t, plan_accel_x, Crossing, Point, SpeedChange};
use crate::profile::AccelerationProfile;
use crate::trajectory::Trajectory;
use crate::{non_negative, KinematicsResult};

fn collect<I>(initial: Point, crossings: I) -> Trajectory
    where I: IntoIterator<Item = Crossing>
{
    let mut traj = Trajectory::new(initial.v);
    let mut last = initial;
    for c in crossings {
        traj.push(c.point.x - last.x, c.point.v, c.acc);
        last = c.point;
    }
    traj.distance = last.x - initial.x;
    traj.time = last.t - initial.t;
    traj
}

/// Consumes crossings until `tripped` holds for one of them. That band is
/// replaced by the partial movement computed by `partial` from the last
/// boundary before it.
fn truncate<F, P>(change: SpeedChange, tripped: F, partial: P) -> Option<Trajectory>
    where F: Fn(&Crossing) -> bool,
          P: Fn(Point, f64) -> Point
{
    let initial = change.initial();
    let mut last = initial;
    let mut kept = Vec::new();
    for c in change {
        if tripped(&c) {
            kept.push(Crossing { point: partial(last, c.acc), acc: c.acc });
            return Some(collect(initial, kept));
        }
        kept.push(c);
        last = c.point;
    }
    None
}

/// Changes speed without any restriction until the target speed is reached.
pub fn speed_change_open(initial_speed: f64, target_speed: f64, profile: &AccelerationProfile)
    -> KinematicsResult<Trajectory> {
    let change = SpeedChange::new(initial_speed, target_speed, profile)?;
    Ok(collect(change.initial(), change))
}

/// Changes speed until either the target speed or the distance limit is
/// reached. `exit_speed` is the speed at the end of the movement.
pub fn speed_change_distance_limited(initial_speed: f64, target_speed: f64,
                                     profile: &AccelerationProfile, distance_limit: f64)
    -> KinematicsResult<Trajectory> {
    non_negative("distance_limit", distance_limit, "m")?;
    let change = SpeedChange::new(initial_speed, target_speed, profile)?;

    let mut open = collect(change.initial(), change.clone());
    if open.distance <= distance_limit {
        open.exit_speed = Some(target_speed);
        return Ok(open);
    }

    let limited = truncate(change,
                           |c| c.point.x >= distance_limit,
                           |last, acc| plan_accel_x(last, distance_limit - last.x, acc));
    Ok(match limited {
        Some(mut traj) => {
            let exit = traj.end().v;
            trace!("distance limit {} m reached at {} m/s", distance_limit, exit);
            traj.distance = distance_limit;
            traj.exit_speed = Some(exit);
            traj
        }
        None => {
            open.exit_speed = Some(target_speed);
            open
        }
    })
}

/// Changes speed during a fixed time window.
///
/// If the target speed is reached within the window, the movement continues
/// at target speed until `processing_time` has passed since its start, and
/// that hold is reported as `cruise_time`. Otherwise the speed change is
/// cut at `time_limit` and `cruise_time` is zero.
pub fn speed_change_time_limited(initial_speed: f64, target_speed: f64,
                                 profile: &AccelerationProfile, time_limit: f64,
                                 processing_time: f64)
    -> KinematicsResult<Trajectory> {
    non_negative("initial_speed", initial_speed, "m/s")?;
    non_negative("target_speed", target_speed, "m/s")?;
    non_negative("time_limit", time_limit, "s")?;

    if time_limit == 0.0 {
        let mut traj = Trajectory::new(initial_speed);
        traj.exit_speed = Some(initial_speed);
        traj.cruise_time = Some(0.0);
        return Ok(traj);
    }

    if initial_speed == target_speed {
        let (dx, dt) = dwell(initial_speed, time_limit)?;
        let mut traj = Trajectory::new(initial_speed);
        traj.hold(dx, dt);
        traj.exit_speed = Some(target_speed);
        traj.cruise_time = Some(dt);
        return Ok(traj);
    }

    let change = SpeedChange::new(initial_speed, target_speed, profile)?;
    let mut open = collect(change.initial(), change.clone());

    if open.time <= time_limit {
        let (dx, dt) = dwell(target_speed, processing_time - open.time)?;
        open.hold(dx, dt);
        open.exit_speed = Some(target_speed);
        open.cruise_time = Some(dt);
        return Ok(open);
    }

    let limited = truncate(change,
                           |c| c.point.t >= time_limit,
                           |last, acc| plan_accel_t(last, time_limit - last.t, acc));
    Ok(match limited {
        Some(mut traj) => {
            traj.time = time_limit;
            traj.exit_speed = Some(traj.end().v);
            traj.cruise_time = Some(0.0);
            traj
        }
        None => {
            open.exit_speed = Some(target_speed);
            open.cruise_time = Some(0.0);
            open
        }
    })
}
