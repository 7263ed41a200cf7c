pub mod config;
pub mod core;
pub mod input;
pub mod vehicle;

// Re-export key types at crate root for convenience
pub use config::{SceneConfig, VehicleConfig, WheelConfig};
pub use core::collision::{CollisionCategory, CollisionFilter};
pub use core::physics::{
    PhysicsWorld, PhysicsBody, PhysicsError, BodyDesc, BodyType,
    ColliderDesc, JointHandle, JointDesc,
};
pub use core::time::StepClock;
pub use input::controls::ControlState;
pub use input::queue::{InputEvent, InputQueue};
pub use vehicle::{
    DriveCommand, SteeringParams, SteeringResponse, Vehicle, VehicleError, Wheel, WheelId,
};
pub use vehicle::steering::direction_to_target;
