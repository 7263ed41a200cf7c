use glam::Vec2;

use crate::config::WheelConfig;
use crate::core::collision::CollisionFilter;
use crate::core::physics::{BodyDesc, ColliderDesc, PhysicsBody, PhysicsError, PhysicsWorld};
use crate::vehicle::steering::SteeringParams;

/// Fraction of the spin removed each tick.
const ANGULAR_DAMPING: f32 = 0.1;
/// Rolling resistance, proportional to forward speed.
const DRAG_COEFFICIENT: f32 = 2.0;

/// Per-tick drive intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveCommand {
    Backward,
    #[default]
    Neutral,
    Forward,
}

impl DriveCommand {
    /// Map a signed movement state: positive drives forward, negative backward.
    pub fn from_signum(state: i32) -> Self {
        match state.signum() {
            1 => DriveCommand::Forward,
            -1 => DriveCommand::Backward,
            _ => DriveCommand::Neutral,
        }
    }

    pub fn signum(self) -> i32 {
        match self {
            DriveCommand::Backward => -1,
            DriveCommand::Neutral => 0,
            DriveCommand::Forward => 1,
        }
    }
}

impl From<i32> for DriveCommand {
    fn from(state: i32) -> Self {
        Self::from_signum(state)
    }
}

/// Impulse that cancels `lateral` velocity on a body of `mass`, capped at
/// `max_impulse` so the tire slips under hard cornering.
#[inline]
pub fn lateral_correction(lateral: Vec2, mass: f32, max_impulse: f32) -> Vec2 {
    (lateral * -mass).clamp_length_max(max_impulse)
}

/// Bang-bang drive controller along the forward axis.
#[inline]
pub fn drive_force(desired_speed: f32, current_speed: f32, max_force: f32) -> f32 {
    if desired_speed > current_speed {
        max_force
    } else if desired_speed < current_speed {
        -max_force
    } else {
        0.0
    }
}

/// One wheel: a small box body whose tire model is applied every tick.
///
/// The wheel does not own its joint. The vehicle stores the joint under the
/// same index as the wheel.
#[derive(Debug, Clone)]
pub struct Wheel {
    config: WheelConfig,
    body: PhysicsBody,
    steering_speed_radians: f32,
    maximum_steering_angle_radians: f32,
}

impl Wheel {
    /// Create the wheel body at `origin + config.position`.
    pub fn spawn(
        world: &mut PhysicsWorld,
        config: &WheelConfig,
        origin: Vec2,
    ) -> Result<Self, PhysicsError> {
        let desc = BodyDesc::dynamic(ColliderDesc::rect(config.size.x, config.size.y))
            .with_position(origin + config.position)
            .with_density(config.density)
            .with_filter(CollisionFilter::wheel());
        let body = world.create_body(&desc)?;

        Ok(Self {
            config: config.clone(),
            body,
            steering_speed_radians: config.steering_speed.to_radians(),
            maximum_steering_angle_radians: config.maximum_steering_angle.to_radians(),
        })
    }

    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    /// Joint anchor on the chassis, in chassis-local space.
    pub fn position(&self) -> Vec2 {
        self.config.position
    }

    pub fn is_steering(&self) -> bool {
        self.config.steering
    }

    /// Wheels without drive force (casters, pure steering wheels) skip the drive pass.
    pub fn is_driven(&self) -> bool {
        self.config.maximum_drive_force > 0.0
    }

    pub fn steering_speed_radians(&self) -> f32 {
        self.steering_speed_radians
    }

    pub fn maximum_steering_angle_radians(&self) -> f32 {
        self.maximum_steering_angle_radians
    }

    pub fn steering_params(&self) -> SteeringParams {
        SteeringParams {
            rate: self.steering_speed_radians,
            max_angle: self.maximum_steering_angle_radians,
            swivel: self.config.swivel,
        }
    }

    fn right_normal(&self, world: &PhysicsWorld) -> Vec2 {
        world.world_vector(&self.body, Vec2::X)
    }

    fn forward_normal(&self, world: &PhysicsWorld) -> Vec2 {
        world.world_vector(&self.body, Vec2::Y)
    }

    /// Sideways component of the wheel's velocity, in world space.
    pub fn lateral_velocity(&self, world: &PhysicsWorld) -> Vec2 {
        let right = self.right_normal(world);
        right * right.dot(world.velocity(&self.body))
    }

    /// Rolling component of the wheel's velocity, in world space.
    pub fn forward_velocity(&self, world: &PhysicsWorld) -> Vec2 {
        let forward = self.forward_normal(world);
        forward * forward.dot(world.velocity(&self.body))
    }

    /// Signed speed along the forward axis.
    pub fn forward_speed(&self, world: &PhysicsWorld) -> f32 {
        self.forward_normal(world).dot(world.velocity(&self.body))
    }

    /// Kill sideways slip (up to the impulse cap), damp spin and apply rolling drag.
    pub fn update_friction(&self, world: &mut PhysicsWorld) {
        let impulse = lateral_correction(
            self.lateral_velocity(world),
            world.mass(&self.body),
            self.config.maximum_lateral_impulse,
        );
        world.apply_impulse(&self.body, impulse);

        let spin = world.angular_velocity(&self.body);
        let inertia = world.inertia(&self.body);
        world.apply_angular_impulse(&self.body, ANGULAR_DAMPING * inertia * -spin);

        let forward = self.forward_normal(world);
        let speed = forward.dot(world.velocity(&self.body));
        world.apply_force(&self.body, forward * (-DRAG_COEFFICIENT * speed));
    }

    /// Push toward the speed limit for `command`. Neutral coasts.
    pub fn update_drive(&self, world: &mut PhysicsWorld, command: DriveCommand) {
        let desired_speed = match command {
            DriveCommand::Forward => self.config.maximum_forward_speed,
            DriveCommand::Backward => self.config.maximum_backward_speed,
            DriveCommand::Neutral => return,
        };

        let forward = self.forward_normal(world);
        let current_speed = forward.dot(world.velocity(&self.body));
        let force = drive_force(desired_speed, current_speed, self.config.maximum_drive_force);
        if force != 0.0 {
            world.apply_force(&self.body, forward * force);
        }
    }
}
