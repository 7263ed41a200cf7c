pub mod chassis;
pub mod error;
pub mod steering;
pub mod wheel;

pub use chassis::{Vehicle, WheelId};
pub use error::VehicleError;
pub use steering::{SteeringParams, SteeringResponse};
pub use wheel::{DriveCommand, Wheel};
