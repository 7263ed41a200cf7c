// vehicle/steering.rs
//
// Angle math for steering wheels locked on revolute joints.
// Pure functions only; the vehicle reads joint angles and writes limits.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How a steering wheel's lock angle moves toward the desired angle each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteeringResponse {
    /// `steering_speed` is the largest angle change per tick.
    #[default]
    StepLimited,
    /// `steering_speed` (in radians) is used as a lerp fraction per tick.
    /// The lock converges geometrically and never quite arrives.
    Interpolate,
}

impl SteeringResponse {
    /// One tick of motion from `current` toward `target`.
    #[inline]
    pub fn advance(self, current: f32, target: f32, rate: f32) -> f32 {
        match self {
            SteeringResponse::StepLimited => current + (target - current).max(-rate).min(rate),
            SteeringResponse::Interpolate => lerp(current, target, rate),
        }
    }
}

/// Steering limits of one wheel, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    pub rate: f32,
    pub max_angle: f32,
    pub swivel: bool,
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp a requested direction into `[-max_angle, max_angle]`.
#[inline]
pub fn clamp_to_lock(direction: f32, max_angle: f32) -> f32 {
    direction.max(-max_angle).min(max_angle)
}

/// Shift `current` by a full turn when `desired` is more than half a turn
/// away, so the wheel takes the short way around.
#[inline]
pub fn rereference(current: f32, desired: f32) -> f32 {
    let difference = desired - current;
    if difference.abs() > PI {
        current + difference.signum() * TAU
    } else {
        current
    }
}

/// Bring an angle at most one turn outside `[-π, π]` back into it.
#[inline]
pub fn wrap_half_turn(angle: f32) -> f32 {
    if angle.abs() > PI {
        angle - angle.signum() * TAU
    } else {
        angle
    }
}

/// Next lock angle for a steering wheel whose joint currently sits at `current`.
pub fn steer_toward(
    current: f32,
    direction: f32,
    params: &SteeringParams,
    response: SteeringResponse,
) -> f32 {
    let desired = clamp_to_lock(direction, params.max_angle);
    let current = if params.swivel {
        rereference(current, desired)
    } else {
        current
    };
    wrap_half_turn(response.advance(current, desired, params.rate))
}

/// Signed angle from a body's forward axis to `target`.
///
/// `heading` is the body rotation. Its forward axis is local +Y, i.e.
/// `(cos(heading + π/2), sin(heading + π/2))`. Positive results are
/// counter-clockwise, matching joint angles, so steering by the result
/// points a wheel at the target. A target at `origin` yields 0.
pub fn direction_to_target(origin: Vec2, heading: f32, target: Vec2) -> f32 {
    let to_target = target - origin;
    let forward = Vec2::from_angle(heading + PI / 2.0);
    forward.perp_dot(to_target).atan2(forward.dot(to_target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f32 = 1e-5;

    fn params(rate: f32, max_angle: f32, swivel: bool) -> SteeringParams {
        SteeringParams { rate, max_angle, swivel }
    }

    #[test]
    fn clamped_direction_stays_within_lock() {
        let max = 0.6;
        let mut direction = -10.0;
        while direction <= 10.0 {
            let clamped = clamp_to_lock(direction, max);
            assert!((-max..=max).contains(&clamped), "{} -> {}", direction, clamped);
            direction += 0.05;
        }
        assert_eq!(clamp_to_lock(0.3, max), 0.3);
    }

    #[test]
    fn interpolate_halfway_to_clamped_target() {
        let p = params(0.5, FRAC_PI_2, false);
        let angle = steer_toward(0.0, PI, &p, SteeringResponse::Interpolate);
        assert!((angle - FRAC_PI_4).abs() < EPS, "angle={}", angle);
    }

    #[test]
    fn step_limited_moves_at_most_rate() {
        let p = params(0.1, PI, false);
        let angle = steer_toward(0.0, 1.0, &p, SteeringResponse::StepLimited);
        assert!((angle - 0.1).abs() < EPS);

        let angle = steer_toward(0.0, -1.0, &p, SteeringResponse::StepLimited);
        assert!((angle + 0.1).abs() < EPS);

        // Close enough: arrive exactly, no overshoot.
        let angle = steer_toward(0.95, 1.0, &p, SteeringResponse::StepLimited);
        assert!((angle - 1.0).abs() < EPS);
    }

    #[test]
    fn step_limited_reaches_target_in_finite_ticks() {
        let p = params(0.05, FRAC_PI_2, false);
        let mut angle = 0.0;
        for _ in 0..40 {
            angle = steer_toward(angle, 1.2, &p, SteeringResponse::StepLimited);
        }
        assert!((angle - 1.2).abs() < EPS, "angle={}", angle);
    }

    #[test]
    fn swivel_takes_the_short_way_around() {
        let p = params(1.0, TAU, true);
        // 3.0 → -3.0 directly is 6 rad; through ±π it is 0.28 rad.
        let angle = steer_toward(3.0, -3.0, &p, SteeringResponse::Interpolate);
        assert!((angle - (-3.0)).abs() < 1e-4, "angle={}", angle);

        let p = params(0.5, TAU, true);
        let angle = steer_toward(3.0, -3.0, &p, SteeringResponse::Interpolate);
        // Halfway along the short arc lands on the ±π seam.
        assert!((angle.abs() - PI).abs() < 1e-4, "angle={}", angle);
    }

    #[test]
    fn rereferenced_path_never_exceeds_half_turn() {
        let mut current = -PI;
        while current <= PI {
            let mut desired = -TAU;
            while desired <= TAU {
                let shifted = rereference(current, desired);
                let path = (desired - shifted).abs();
                assert!(path <= PI + EPS, "c={} d={} path={}", current, desired, path);
                desired += 0.1;
            }
            current += 0.1;
        }
    }

    #[test]
    fn non_swivel_wheel_unwinds_the_long_way() {
        let p = params(0.5, TAU, false);
        let angle = steer_toward(3.0, -3.0, &p, SteeringResponse::Interpolate);
        assert!((angle - 0.0).abs() < EPS, "angle={}", angle);
    }

    #[test]
    fn wrap_brings_angle_into_half_turn() {
        assert!((wrap_half_turn(PI + 0.5) - (-PI + 0.5)).abs() < EPS);
        assert!((wrap_half_turn(-PI - 0.5) - (PI - 0.5)).abs() < EPS);
        assert_eq!(wrap_half_turn(1.0), 1.0);
        assert_eq!(wrap_half_turn(PI), PI);
    }

    #[test]
    fn settled_wheel_is_left_alone() {
        for response in [SteeringResponse::StepLimited, SteeringResponse::Interpolate] {
            for swivel in [false, true] {
                let p = params(0.3, FRAC_PI_2, swivel);
                let once = steer_toward(0.7, 0.7, &p, response);
                assert_eq!(once, 0.7);
                assert_eq!(steer_toward(once, 0.7, &p, response), once);
            }
        }
    }

    #[test]
    fn lock_beyond_half_turn_is_stable() {
        // A full-turn lock can ask for 3.5 rad; the joint reports it as 3.5 - 2π.
        let p = params(0.2, TAU, true);
        let reported = 3.5 - TAU;
        let angle = steer_toward(reported, 3.5, &p, SteeringResponse::StepLimited);
        assert!((angle - reported).abs() < EPS, "angle={}", angle);
    }

    #[test]
    fn direction_points_at_target() {
        let origin = Vec2::new(10.0, 10.0);
        let ahead = direction_to_target(origin, 0.0, origin + Vec2::new(0.0, 5.0));
        assert!(ahead.abs() < EPS);

        let right = direction_to_target(origin, 0.0, origin + Vec2::new(5.0, 0.0));
        assert!((right + FRAC_PI_2).abs() < EPS, "right={}", right);

        let left = direction_to_target(origin, 0.0, origin + Vec2::new(-5.0, 0.0));
        assert!((left - FRAC_PI_2).abs() < EPS, "left={}", left);

        // Rotating the body a quarter turn moves "ahead" to -X.
        let turned = direction_to_target(origin, FRAC_PI_2, origin + Vec2::new(-5.0, 0.0));
        assert!(turned.abs() < EPS, "turned={}", turned);

        assert_eq!(direction_to_target(origin, 1.0, origin), 0.0);
    }
}
