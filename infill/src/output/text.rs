use kinematics::Trajectory;
use std::fmt::Write;

use crate::optimize::{LossSurface, Placement};

fn trajectory_lines(s: &mut String, name: &str, t: &Trajectory) -> Result<(), failure::Error> {
    for step in t.steps() {
        match step.acc {
            Some(a) => writeln!(s, "{} {:.2} {:.2} {}", name, step.x, step.v * 3.6, a)?,
            None => writeln!(s, "{} {:.2} {:.2} -", name, step.x, step.v * 3.6)?,
        }
    }
    Ok(())
}

/// Print the markant points of every scenario trajectory, one per line on
/// the format `scenario distance[m] speed[km/h] acceleration[m/s²]`.
pub fn markant_points(p: &Placement) -> Result<String, failure::Error> {
    let mut s = String::new();
    trajectory_lines(&mut s, "reference", &p.reference)?;
    trajectory_lines(&mut s, "target", &p.target)?;
    trajectory_lines(&mut s, "outer", &p.best.outer_trajectory)?;
    if let Some(ref t) = p.best.inner_trajectory {
        trajectory_lines(&mut s, "inner", t)?;
    }
    Ok(s)
}

/// One explored pair per line: `outer inner loss`.
pub fn loss_surface(surface: &LossSurface) -> Result<String, failure::Error> {
    let mut s = String::new();
    for (outer, inner, loss) in surface.rows() {
        writeln!(s, "{} {} {:.4}", outer, inner, loss)?;
    }
    Ok(s)
}
