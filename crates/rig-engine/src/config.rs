use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::vehicle::error::VehicleError;
use crate::vehicle::steering::SteeringResponse;

/// Configuration for one wheel. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Joint anchor on the chassis, in chassis-local space.
    pub position: Vec2,
    pub steering: bool,
    /// Degrees per tick; see [`SteeringResponse`] for how it is applied.
    pub steering_speed: f32,
    pub maximum_steering_angle: f32,
    pub maximum_forward_speed: f32,
    /// Signed; normally zero or negative.
    pub maximum_backward_speed: f32,
    /// Zero marks a wheel that is never driven.
    pub maximum_drive_force: f32,
    pub maximum_lateral_impulse: f32,
    /// May turn through more than half a turn (caster/pivot).
    pub swivel: bool,
    /// Full width and height of the wheel box.
    pub size: Vec2,
    pub density: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            steering: false,
            steering_speed: 1.0,
            maximum_steering_angle: 0.0,
            maximum_forward_speed: 100.0,
            maximum_backward_speed: -20.0,
            maximum_drive_force: 150.0,
            maximum_lateral_impulse: 8.5,
            swivel: false,
            size: Vec2::new(4.0, 8.0),
            density: 1.0,
        }
    }
}

impl WheelConfig {
    /// A default wheel anchored at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    fn validate(&self, wheel: usize) -> Result<(), VehicleError> {
        let limits = [
            ("steering_speed", self.steering_speed),
            ("maximum_steering_angle", self.maximum_steering_angle),
            ("maximum_drive_force", self.maximum_drive_force),
            ("maximum_lateral_impulse", self.maximum_lateral_impulse),
        ];
        for (field, value) in limits {
            if !value.is_finite() || value < 0.0 {
                return Err(VehicleError::InvalidLimit { wheel, field, value });
            }
        }

        let positive = [
            ("size.x", self.size.x),
            ("size.y", self.size.y),
            ("density", self.density),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(VehicleError::NonPositive { wheel, field, value });
            }
        }

        if self.maximum_backward_speed > 0.0 {
            log::warn!(
                "wheel {}: maximum_backward_speed {} is positive, reverse will push forward",
                wheel,
                self.maximum_backward_speed
            );
        }
        if self.steering && self.maximum_steering_angle == 0.0 {
            log::warn!("wheel {}: steering enabled with a zero steering angle", wheel);
        }
        Ok(())
    }
}

/// Configuration for a vehicle: chassis fixtures plus wheels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Convex polygons as flat `[x0, y0, x1, y1, ...]` lists, chassis-local.
    pub fixtures: Vec<Vec<f32>>,
    /// Overrides the mass center computed from the fixtures.
    pub center_of_mass: Vec2,
    /// World position of the chassis origin at spawn.
    pub spawn_position: Vec2,
    pub density: f32,
    pub angular_damping: f32,
    pub steering_response: SteeringResponse,
    pub wheels: Vec<WheelConfig>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            fixtures: Vec::new(),
            center_of_mass: Vec2::ZERO,
            spawn_position: Vec2::ZERO,
            density: 0.1,
            angular_damping: 3.0,
            steering_response: SteeringResponse::default(),
            wheels: Vec::new(),
        }
    }
}

impl VehicleConfig {
    /// Parse a vehicle from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, VehicleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON vehicle file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VehicleError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check fixtures and wheel limits. Suspicious but usable values are logged.
    pub fn validate(&self) -> Result<(), VehicleError> {
        if self.fixtures.is_empty() {
            return Err(VehicleError::NoFixtures);
        }
        for (fixture, coords) in self.fixtures.iter().enumerate() {
            if coords.len() % 2 != 0 {
                return Err(VehicleError::OddCoordinateCount {
                    fixture,
                    len: coords.len(),
                });
            }
            if coords.len() < 6 {
                return Err(VehicleError::TooFewVertices {
                    fixture,
                    count: coords.len() / 2,
                });
            }
        }
        if self.density.is_nan() || self.density <= 0.0 {
            return Err(VehicleError::ChassisDensity(self.density));
        }
        for (index, wheel) in self.wheels.iter().enumerate() {
            wheel.validate(index)?;
        }
        Ok(())
    }

    /// Chassis fixtures as vertex lists.
    pub fn polygons(&self) -> Vec<Vec<Vec2>> {
        self.fixtures
            .iter()
            .map(|coords| {
                coords
                    .chunks_exact(2)
                    .map(|xy| Vec2::new(xy[0], xy[1]))
                    .collect()
            })
            .collect()
    }

    /// The eight-pointed star: eight kite fixtures of radius 100, a
    /// steerable swivel wheel at each of the eight rim positions, and one
    /// driven, non-swivel steering wheel at the center.
    pub fn star() -> Self {
        const R: f32 = 100.0;
        const KITE_X: f32 = 55.4327;
        const KITE_Y: f32 = 22.9610;
        const WHEEL_RING: f32 = 70.0;

        let fixtures: Vec<Vec<f32>> = (0..8)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::FRAC_PI_4;
                let rotate = |p: Vec2| Vec2::from_angle(angle).rotate(p);
                let points = [
                    Vec2::ZERO,
                    rotate(Vec2::new(KITE_X, KITE_Y)),
                    rotate(Vec2::new(R, 0.0)),
                    rotate(Vec2::new(KITE_X, -KITE_Y)),
                ];
                points.iter().flat_map(|p| [p.x, p.y]).collect()
            })
            .collect();

        let rim = WheelConfig {
            steering: true,
            steering_speed: 0.5,
            maximum_steering_angle: 360.0,
            maximum_forward_speed: 0.0,
            maximum_backward_speed: 0.0,
            maximum_drive_force: 0.0,
            maximum_lateral_impulse: 3.5,
            swivel: true,
            ..WheelConfig::default()
        };
        let mut wheels: Vec<WheelConfig> = (0..8)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::FRAC_PI_4;
                WheelConfig {
                    position: Vec2::from_angle(angle) * WHEEL_RING,
                    ..rim.clone()
                }
            })
            .collect();

        wheels.push(WheelConfig {
            steering: true,
            steering_speed: 0.5,
            maximum_steering_angle: 360.0,
            maximum_forward_speed: 300.0,
            maximum_backward_speed: -100.0,
            maximum_drive_force: 20000.0,
            swivel: false,
            ..WheelConfig::default()
        });

        Self {
            fixtures,
            wheels,
            ..Self::default()
        }
    }
}

/// Settings for the simulation loop around a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Gravity for the physics world. Top-down scenes use zero.
    pub gravity: Vec2,
    /// Upper bound on fixed ticks run for a single frame.
    pub max_steps_per_frame: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            gravity: Vec2::ZERO,
            max_steps_per_frame: 10,
        }
    }
}
