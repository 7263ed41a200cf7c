//! Errors raised while building a vehicle.

use thiserror::Error;

use crate::core::physics::PhysicsError;

/// Invalid vehicle or wheel configuration.
#[derive(Debug, Error)]
pub enum VehicleError {
    /// The chassis needs at least one fixture.
    #[error("vehicle has no chassis fixtures")]
    NoFixtures,

    /// Fixture vertices are given as flat `x, y` pairs.
    #[error("fixture {fixture} has an odd number of coordinates ({len})")]
    OddCoordinateCount {
        /// Index of the fixture.
        fixture: usize,
        /// Length of its coordinate list.
        len: usize,
    },

    /// A polygon needs three vertices.
    #[error("fixture {fixture} has {count} vertices, at least 3 are required")]
    TooFewVertices {
        /// Index of the fixture.
        fixture: usize,
        /// Number of vertices found.
        count: usize,
    },

    /// A limit that must be zero or positive is negative or not finite.
    #[error("wheel {wheel}: {field} must be a finite value >= 0, got {value}")]
    InvalidLimit {
        /// Index of the wheel.
        wheel: usize,
        /// Configuration field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Wheel boxes and densities must be strictly positive.
    #[error("wheel {wheel}: {field} must be > 0, got {value}")]
    NonPositive {
        /// Index of the wheel.
        wheel: usize,
        /// Configuration field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Chassis density must be strictly positive.
    #[error("chassis density must be > 0, got {0}")]
    ChassisDensity(f32),

    /// The physics world rejected a body.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// The configuration file could not be read.
    #[error("cannot read vehicle config: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON configuration could not be parsed.
    #[error("invalid vehicle config: {0}")]
    Config(#[from] serde_json::Error),
}
