use crate::profile::{AccelerationProfile, Direction};
use crate::{non_negative, KinematicsError, KinematicsResult};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeDistVel {
    pub t: f64,
    pub x: f64,
    pub v: f64,
}
pub type Point = TimeDistVel;

// Plan types
pub fn plan_accel_v(start: Point, v: f64, acc: f64) -> Point {
    let dt = (v - start.v) / acc;
    let dx = start.v * dt + 0.5 * acc * dt * dt;
    Point {
        t: start.t + dt,
        x: start.x + dx,
        v: v,
    }
}

/// Constant acceleration over a given distance. Works for braking too
/// (negative `acc`), giving the earliest time the distance is covered.
pub fn plan_accel_x(start: Point, dx: f64, acc: f64) -> Point {
    // v^2 - v0^2 = 2 a s
    let v = (start.v * start.v + 2.0 * acc * dx).max(0.0).sqrt();
    let dt = if acc != 0.0 { (v - start.v) / acc } else { dx / start.v };
    Point {
        t: start.t + dt,
        x: start.x + dx,
        v: v,
    }
}

pub fn plan_accel_t(start: Point, dt: f64, acc: f64) -> Point {
    Point {
        t: start.t + dt,
        x: start.x + start.v * dt + 0.5 * acc * dt * dt,
        v: start.v + acc * dt,
    }
}

/// Constant speed movement over at least `distance` and for at least
/// `time_minimum`. Returns travelled distance and elapsed time.
///
/// At zero speed only a stationary hold is possible: any positive
/// distance is rejected.
pub fn cruise(distance: f64, speed: f64, time_minimum: f64) -> KinematicsResult<(f64, f64)> {
    non_negative("distance", distance, "m")?;
    non_negative("speed", speed, "m/s")?;
    non_negative("time_minimum", time_minimum, "s")?;

    if speed == 0.0 {
        if distance > 0.0 {
            return Err(KinematicsError::InvalidArgument {
                quantity: "speed", value: speed, unit: "m/s" });
        }
        return Ok((0.0, time_minimum));
    }

    let time_elapsed = (distance / speed).max(time_minimum);
    Ok((time_elapsed * speed, time_elapsed))
}

/// Hold a constant speed for a fixed time.
pub fn dwell(speed: f64, time: f64) -> KinematicsResult<(f64, f64)> {
    non_negative("speed", speed, "m/s")?;
    non_negative("time", time, "s")?;
    cruise(0.0, speed, time)
}

/// Boundary crossed while changing speed: the state at the end of a band
/// and the acceleration that drove the movement through it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Crossing {
    pub point: Point,
    pub acc: f64,
}

/// Lazy stepper through the bands of an acceleration profile, from an
/// initial to a target speed. Yields one `Crossing` per band and ends when
/// the target speed is reached exactly. Cloning restarts from the clone's
/// position.
#[derive(Clone, Debug)]
pub struct SpeedChange<'a> {
    profile: &'a AccelerationProfile,
    direction: Direction,
    target: f64,
    current: Point,
    segment: usize,
}

impl<'a> SpeedChange<'a> {
    pub fn new(initial_speed: f64, target_speed: f64, profile: &'a AccelerationProfile)
        -> KinematicsResult<SpeedChange<'a>> {
        non_negative("initial_speed", initial_speed, "m/s")?;
        non_negative("target_speed", target_speed, "m/s")?;
        if target_speed > profile.max_speed() {
            return Err(KinematicsError::InvalidArgument {
                quantity: "target_speed", value: target_speed, unit: "m/s" });
        }

        let direction = if target_speed >= initial_speed {
            Direction::Accelerate
        } else {
            Direction::Decelerate
        };

        let change = SpeedChange {
            profile,
            direction,
            target: target_speed,
            current: Point { t: 0.0, x: 0.0, v: initial_speed },
            segment: profile.segment(initial_speed, direction),
        };
        change.validate()?;
        Ok(change)
    }

    pub fn initial(&self) -> Point {
        self.current
    }

    /// Speed at which band `segment` is left.
    fn bound(&self, segment: usize) -> f64 {
        let steps = self.profile.steps();
        match self.direction {
            Direction::Accelerate => steps[segment].threshold.min(self.target),
            Direction::Decelerate => steps[segment - 1].threshold.max(self.target),
        }
    }

    /// Walks the bands to be crossed and checks that each one can
    /// actually move the speed towards the target.
    fn validate(&self) -> KinematicsResult<()> {
        let steps = self.profile.steps();
        let mut v = self.current.v;
        let mut segment = self.segment;
        while v != self.target {
            if segment == 0 || segment >= steps.len() {
                return Err(KinematicsError::InvalidProfile(
                        format!("speed {} m/s outside of profile", v)));
            }
            let acc = steps[segment].accel;
            let usable = match self.direction {
                Direction::Accelerate => acc > 0.0,
                Direction::Decelerate => acc < 0.0,
            };
            if !usable {
                return Err(KinematicsError::InvalidProfile(
                        format!("acceleration {} m/s² cannot change speed {:?} from {} m/s",
                                acc, self.direction, v)));
            }
            v = self.bound(segment);
            segment = match self.direction {
                Direction::Accelerate => segment + 1,
                Direction::Decelerate => segment - 1,
            };
        }
        Ok(())
    }
}

impl<'a> Iterator for SpeedChange<'a> {
    type Item = Crossing;

    fn next(&mut self) -> Option<Crossing> {
        if self.current.v == self.target {
            return None;
        }
        let acc = self.profile.steps()[self.segment].accel;
        let point = plan_accel_v(self.current, self.bound(self.segment), acc);
        self.current = point;
        self.segment = match self.direction {
            Direction::Accelerate => self.segment + 1,
            Direction::Decelerate => self.segment - 1,
        };
        Some(Crossing { point, acc })
    }
}
