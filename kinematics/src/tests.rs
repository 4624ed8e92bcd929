use crate::*;
use crate::dynamics::SpeedChange;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

fn braking() -> AccelerationProfile {
    AccelerationProfile::new(vec![(0.0, 0.0), (30.0, -1.0)]).unwrap()
}

fn traction() -> AccelerationProfile {
    AccelerationProfile::new(vec![(0.0, 0.0), (10.0, 1.0), (20.0, 0.5)]).unwrap()
}

#[test]
fn test_cruise() {
    assert_eq!(cruise(500.0, 25.0, 0.0).unwrap(), (500.0, 20.0));
    assert_eq!(cruise(500.0, 25.0, 30.0).unwrap(), (750.0, 30.0));
    assert!(cruise(-1.0, 25.0, 0.0).is_err());
    assert!(cruise(1.0, -25.0, 0.0).is_err());
    assert!(cruise(1.0, 25.0, -1.0).is_err());
}

#[test]
fn test_dwell() {
    assert_eq!(dwell(10.0, 3.0).unwrap(), (30.0, 3.0));
    assert_eq!(dwell(10.0, 3.0).unwrap(), cruise(0.0, 10.0, 3.0).unwrap());
    // Standing still is a pure time hold.
    assert_eq!(dwell(0.0, 5.0).unwrap(), (0.0, 5.0));
    assert!(cruise(10.0, 0.0, 0.0).is_err());
    assert_eq!(dwell(10.0, -1.0), Err(KinematicsError::InvalidArgument {
        quantity: "time", value: -1.0, unit: "s" }));
}

#[test]
fn test_open_no_change() {
    for &v in &[0.0, 5.0, 10.0, 17.5, 30.0] {
        let t = speed_change_open(v, v, &braking()).unwrap();
        assert_eq!(t.distance, 0.0);
        assert_eq!(t.time, 0.0);
        assert_eq!(t.points().len(), 1);
        assert!(t.accelerations().is_empty());
    }
}

#[test]
fn test_open_constant_braking() {
    let t = speed_change_open(20.0, 0.0, &braking()).unwrap();
    assert_close(t.distance, 200.0);
    assert_close(t.time, 20.0);
    assert_eq!(t.accelerations(), &[-1.0]);
    assert_eq!(t.end().v, 0.0);
}

#[test]
fn test_open_two_bands() {
    let t = speed_change_open(0.0, 20.0, &traction()).unwrap();
    assert_close(t.distance, 350.0);
    assert_close(t.time, 30.0);
    let xs = t.points().iter().map(|p| p.dx).collect::<Vec<_>>();
    let vs = t.points().iter().map(|p| p.v).collect::<Vec<_>>();
    assert_eq!(xs.len(), 3);
    assert_close(xs[1], 50.0);
    assert_close(xs[2], 350.0);
    assert_eq!(vs, vec![0.0, 10.0, 20.0]);
    assert_eq!(t.accelerations(), &[1.0, 0.5]);

    let steps = t.steps().collect::<Vec<_>>();
    assert_eq!(steps[0].acc, Some(1.0));
    assert_eq!(steps[2].acc, None);
}

#[test]
fn test_open_starts_inside_band() {
    // Starting on a threshold uses the band above it when accelerating.
    let t = speed_change_open(10.0, 15.0, &traction()).unwrap();
    assert_eq!(t.accelerations(), &[0.5]);
    assert_close(t.time, 10.0);

    // Braking from a threshold uses the band below it.
    let brk = AccelerationProfile::new(vec![(0.0, 0.0), (10.0, -0.5), (30.0, -1.0)]).unwrap();
    let t = speed_change_open(10.0, 0.0, &brk).unwrap();
    assert_eq!(t.accelerations(), &[-0.5]);
    assert_close(t.distance, 100.0);
    let t = speed_change_open(20.0, 0.0, &brk).unwrap();
    assert_eq!(t.accelerations(), &[-1.0, -0.5]);
    assert_close(t.distance, 150.0 + 100.0);
}

#[test]
fn test_open_invalid() {
    assert!(speed_change_open(-1.0, 0.0, &braking()).is_err());
    assert!(speed_change_open(1.0, -1.0, &braking()).is_err());
    assert_eq!(speed_change_open(0.0, 40.0, &traction()).unwrap_err(),
               KinematicsError::InvalidArgument {
                   quantity: "target_speed", value: 40.0, unit: "m/s" });
    let flat = AccelerationProfile::new(vec![(0.0, 0.0), (10.0, 0.0)]).unwrap();
    match speed_change_open(0.0, 5.0, &flat) {
        Err(KinematicsError::InvalidProfile(_)) => {},
        x => panic!("unexpected {:?}", x),
    }
    // A traction profile cannot brake.
    assert!(speed_change_open(10.0, 0.0, &traction()).is_err());
}

#[test]
fn test_stepper_restartable() {
    let p = traction();
    let change = SpeedChange::new(0.0, 20.0, &p).unwrap();
    let copy = change.clone();
    let a = change.collect::<Vec<_>>();
    let b = copy.collect::<Vec<_>>();
    assert_eq!(a.len(), 2);
    assert_eq!(a, b);

    let mut partial = SpeedChange::new(0.0, 20.0, &p).unwrap();
    partial.next();
    assert_eq!(partial.clone().count(), 1);
}

#[test]
fn test_distance_limited_unbounded() {
    let open = speed_change_open(0.0, 20.0, &traction()).unwrap();
    let lim = speed_change_distance_limited(0.0, 20.0, &traction(), 1e9).unwrap();
    assert_eq!(lim.distance, open.distance);
    assert_eq!(lim.time, open.time);
    assert_eq!(lim.points(), open.points());
    assert_eq!(lim.accelerations(), open.accelerations());
    assert_eq!(lim.exit_speed, Some(20.0));
}

#[test]
fn test_distance_limited_braking() {
    let t = speed_change_distance_limited(20.0, 0.0, &braking(), 150.0).unwrap();
    assert_close(t.distance, 150.0);
    assert_close(t.exit_speed.unwrap(), 10.0);
    assert_close(t.time, 10.0);
    assert_eq!(t.points().len(), 2);
}

#[test]
fn test_distance_limited_second_band() {
    let t = speed_change_distance_limited(0.0, 20.0, &traction(), 200.0).unwrap();
    let exit = 250.0f64.sqrt();
    assert_close(t.distance, 200.0);
    assert_close(t.exit_speed.unwrap(), exit);
    assert_close(t.time, 10.0 + (exit - 10.0) / 0.5);
    assert_eq!(t.accelerations(), &[1.0, 0.5]);
    assert_close(t.end().dx, 200.0);
}

#[test]
fn test_distance_limited_monotone() {
    let mut prev = 20.0;
    for i in 0..=25 {
        let limit = i as f64 * 10.0;
        let t = speed_change_distance_limited(20.0, 0.0, &braking(), limit).unwrap();
        let exit = t.exit_speed.unwrap();
        assert!(exit <= prev + 1e-12);
        assert!(exit >= 0.0);
        prev = exit;
    }
    assert_eq!(prev, 0.0);
    let t = speed_change_distance_limited(20.0, 0.0, &braking(), 0.0).unwrap();
    assert_close(t.exit_speed.unwrap(), 20.0);
    assert!(speed_change_distance_limited(20.0, 0.0, &braking(), -1.0).is_err());
}

#[test]
fn test_time_limited_zero_window() {
    let t = speed_change_time_limited(20.0, 0.0, &braking(), 0.0, 5.0).unwrap();
    assert_eq!(t.distance, 0.0);
    assert_eq!(t.exit_speed, Some(20.0));
    assert_eq!(t.cruise_time, Some(0.0));
}

#[test]
fn test_time_limited_same_speed() {
    let t = speed_change_time_limited(12.0, 12.0, &braking(), 4.0, 9.0).unwrap();
    let (dx, dt) = dwell(12.0, 4.0).unwrap();
    assert_eq!(t.distance, dx);
    assert_eq!(t.time, dt);
    assert_eq!(t.cruise_time, Some(4.0));
    assert_eq!(t.accelerations(), &[0.0]);
}

#[test]
fn test_time_limited_completes() {
    let t = speed_change_time_limited(20.0, 10.0, &braking(), 15.0, 15.0).unwrap();
    assert_close(t.time, 15.0);
    assert_close(t.distance, 150.0 + 50.0);
    assert_close(t.cruise_time.unwrap(), 5.0);
    assert_eq!(t.exit_speed, Some(10.0));
    assert_eq!(t.accelerations(), &[-1.0, 0.0]);
}

#[test]
fn test_time_limited_cut() {
    let t = speed_change_time_limited(20.0, 10.0, &braking(), 4.0, 4.0).unwrap();
    assert_eq!(t.time, 4.0);
    assert_close(t.exit_speed.unwrap(), 16.0);
    assert_close(t.distance, 72.0);
    assert_eq!(t.cruise_time, Some(0.0));
    assert!(speed_change_time_limited(20.0, 10.0, &braking(), -4.0, 4.0).is_err());
}

fn two_band_braking() -> AccelerationProfile {
    AccelerationProfile::new(vec![(0.0, 0.0), (10.0, -0.5), (30.0, -1.0)]).unwrap()
}

#[test]
fn test_time_limited_cut_after_band() {
    // 10 s in the upper band, the remaining 4 s in the lower one.
    let t = speed_change_time_limited(20.0, 0.0, &two_band_braking(), 14.0, 14.0).unwrap();
    assert_eq!(t.time, 14.0);
    assert_close(t.distance, 186.0);
    assert_close(t.exit_speed.unwrap(), 8.0);
    assert_eq!(t.cruise_time, Some(0.0));
    let xs = t.points().iter().map(|p| p.dx).collect::<Vec<_>>();
    assert_eq!(xs.len(), 3);
    assert_close(xs[0], 0.0);
    assert_close(xs[1], 150.0);
    assert_close(xs[2], 186.0);
    assert_eq!(t.accelerations(), &[-1.0, -0.5]);
}

#[test]
fn test_distance_limited_monotone_across_bands() {
    let profile = two_band_braking();
    let mut last = std::f64::INFINITY;
    for limit in 0..261 {
        let t = speed_change_distance_limited(20.0, 0.0, &profile, limit as f64).unwrap();
        let exit = t.exit_speed.unwrap();
        assert!(exit <= last, "{} m/s after {} m/s at {} m", exit, last, limit);
        last = exit;
    }
    assert_eq!(last, 0.0);
}

#[test]
fn test_profile() {
    assert!(AccelerationProfile::new(vec![]).is_err());
    assert!(AccelerationProfile::new(vec![(0.0, 0.0), (10.0, 1.0), (10.0, 0.5)]).is_err());
    assert!(AccelerationProfile::new(vec![(0.0, 0.0), (std::f64::NAN, 1.0)]).is_err());

    let p = AccelerationProfile::from_kph(&[0.0, 36.0, 72.0], &[0.0, 1.0, 0.5]).unwrap();
    assert_close(p.max_speed(), 20.0);
    assert!(AccelerationProfile::from_kph(&[0.0, 36.0], &[0.0]).is_err());

    let g = p.with_gradient(10.0, 0.0);
    assert_eq!(g.steps()[0].accel, 0.0);
    assert_close(g.steps()[1].accel, 1.0 - 0.0981);
    assert_close(g.steps()[2].accel, 0.5 - 0.0981);
    let accels = p.with_gradient(-10.0, 100.0).band_accels().collect::<Vec<_>>();
    assert_close(accels[0], 1.0 + 0.04905);
}
