/// A markant point: cumulative distance and the speed reached there.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceVelocity {
    pub dx: f64,
    pub v: f64,
}

/// A markant point together with the acceleration driving the movement
/// to the next point. The last step of a trajectory has no acceleration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MovementStep {
    pub x: f64,
    pub v: f64,
    pub acc: Option<f64>,
}

/// Sequence of markant points with the totals of the movement.
///
/// There is always one more point than accelerations, and point distances
/// never decrease.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub distance: f64,
    pub time: f64,
    pub exit_speed: Option<f64>,
    pub cruise_time: Option<f64>,
    points: Vec<DistanceVelocity>,
    accelerations: Vec<f64>,
}

impl Trajectory {
    /// Empty movement starting at distance 0 with the given speed.
    pub fn new(initial_speed: f64) -> Trajectory {
        Trajectory {
            distance: 0.0,
            time: 0.0,
            exit_speed: None,
            cruise_time: None,
            points: vec![DistanceVelocity { dx: 0.0, v: initial_speed }],
            accelerations: Vec::new(),
        }
    }

    pub fn points(&self) -> &[DistanceVelocity] {
        &self.points
    }

    pub fn accelerations(&self) -> &[f64] {
        &self.accelerations
    }

    pub fn steps<'a>(&'a self) -> impl Iterator<Item = MovementStep> + 'a {
        self.points.iter().enumerate().map(move |(i, p)| MovementStep {
            x: p.dx,
            v: p.v,
            acc: self.accelerations.get(i).cloned(),
        })
    }

    pub fn start(&self) -> DistanceVelocity {
        self.points[0]
    }

    pub fn end(&self) -> DistanceVelocity {
        self.points[self.points.len() - 1]
    }

    /// Adds a markant point `dx` beyond the current end, reached with
    /// acceleration `acc`. Totals are left to the caller.
    pub fn push(&mut self, dx: f64, v: f64, acc: f64) {
        let x = self.end().dx + dx;
        self.points.push(DistanceVelocity { dx: x, v });
        self.accelerations.push(acc);
    }

    /// Constant speed movement over `dx` lasting `dt`.
    pub fn hold(&mut self, dx: f64, dt: f64) {
        let v = self.end().v;
        self.push(dx, v, 0.0);
        self.distance += dx;
        self.time += dt;
    }

    /// Concatenates `other` behind the current end. The first point of
    /// `other` coincides with our last one and is dropped.
    pub fn append(&mut self, other: &Trajectory) {
        let offset = self.end().dx;
        self.points.extend(other.points.iter().skip(1)
                           .map(|p| DistanceVelocity { dx: offset + p.dx, v: p.v }));
        self.accelerations.extend_from_slice(&other.accelerations);
        self.distance += other.distance;
        self.time += other.time;
    }
}
