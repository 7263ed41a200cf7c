use glam::Vec2;

use crate::config::VehicleConfig;
use crate::core::collision::CollisionFilter;
use crate::core::physics::{
    BodyDesc, ColliderDesc, JointDesc, JointHandle, PhysicsBody, PhysicsWorld,
};
use crate::vehicle::error::VehicleError;
use crate::vehicle::steering::{steer_toward, SteeringResponse};
use crate::vehicle::wheel::{DriveCommand, Wheel};

/// Index of a wheel within its vehicle. Also indexes the wheel's joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WheelId(pub usize);

/// A chassis body with wheels pinned to it by angle-locked revolute joints.
///
/// Steering works by re-locking each steering wheel's joint (lower = upper)
/// a little closer to the desired angle every tick.
#[derive(Debug)]
pub struct Vehicle {
    chassis: PhysicsBody,
    wheels: Vec<Wheel>,
    joints: Vec<JointHandle>,
    steering_response: SteeringResponse,
}

impl Vehicle {
    /// Build the wheels, then the chassis, then one locked joint per wheel.
    ///
    /// On error, nothing created so far is left in the world.
    pub fn spawn(world: &mut PhysicsWorld, config: &VehicleConfig) -> Result<Self, VehicleError> {
        config.validate()?;

        let mut colliders = config
            .polygons()
            .into_iter()
            .map(|points| ColliderDesc::ConvexPolygon { points });
        let first = colliders.next().ok_or(VehicleError::NoFixtures)?;
        let chassis_desc = colliders
            .fold(BodyDesc::dynamic(first), BodyDesc::with_collider)
            .with_position(config.spawn_position)
            .with_density(config.density)
            .with_filter(CollisionFilter::vehicle())
            .with_angular_damping(config.angular_damping)
            .with_center_of_mass(config.center_of_mass);

        let mut wheels = Vec::with_capacity(config.wheels.len());
        for wheel_config in &config.wheels {
            match Wheel::spawn(world, wheel_config, config.spawn_position) {
                Ok(wheel) => wheels.push(wheel),
                Err(err) => {
                    remove_wheels(world, &wheels);
                    return Err(err.into());
                }
            }
        }

        let chassis = match world.create_body(&chassis_desc) {
            Ok(body) => body,
            Err(err) => {
                remove_wheels(world, &wheels);
                return Err(err.into());
            }
        };

        let joints = wheels
            .iter()
            .map(|wheel| {
                log::debug!("wheel joint at {:?}", wheel.position());
                world.create_joint(&chassis, wheel.body(), &JointDesc::Revolute {
                    anchor_a: wheel.position(),
                    anchor_b: Vec2::ZERO,
                    limits: Some([0.0, 0.0]),
                })
            })
            .collect();

        log::info!(
            "vehicle spawned at {:?}: {} fixtures, {} wheels, {:?} steering",
            config.spawn_position,
            config.fixtures.len(),
            wheels.len(),
            config.steering_response
        );

        Ok(Self {
            chassis,
            wheels,
            joints,
            steering_response: config.steering_response,
        })
    }

    /// Remove every joint, wheel body and the chassis from the world.
    pub fn despawn(self, world: &mut PhysicsWorld) {
        for joint in &self.joints {
            world.remove_joint(*joint);
        }
        remove_wheels(world, &self.wheels);
        world.remove_body(&self.chassis);
        log::info!("vehicle despawned ({} wheels)", self.wheels.len());
    }

    /// One control tick: friction on every wheel, then drive on driven
    /// wheels, then steering on steering wheels. Call once before each
    /// world step. `direction` is the desired steering angle in radians,
    /// before any per-wheel clamping.
    pub fn update(&self, world: &mut PhysicsWorld, command: DriveCommand, direction: f32) {
        for wheel in &self.wheels {
            wheel.update_friction(world);
        }

        for wheel in self.wheels.iter().filter(|w| w.is_driven()) {
            wheel.update_drive(world, command);
        }

        for (wheel, joint) in self.wheels.iter().zip(&self.joints) {
            if !wheel.is_steering() {
                continue;
            }
            let current = world.joint_angle(*joint);
            let angle = steer_toward(
                current,
                direction,
                &wheel.steering_params(),
                self.steering_response,
            );
            log::trace!("steer {:?}: {:.4} -> {:.4}", wheel.position(), current, angle);
            world.set_joint_limits(*joint, angle, angle);
        }
    }

    pub fn chassis(&self) -> &PhysicsBody {
        &self.chassis
    }

    /// Chassis position and rotation.
    pub fn chassis_pose(&self, world: &PhysicsWorld) -> (Vec2, f32) {
        world.body_position(&self.chassis)
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    pub fn wheel(&self, id: WheelId) -> Option<&Wheel> {
        self.wheels.get(id.0)
    }

    pub fn wheel_ids(&self) -> impl Iterator<Item = WheelId> {
        (0..self.wheels.len()).map(WheelId)
    }

    pub fn joint(&self, id: WheelId) -> Option<JointHandle> {
        self.joints.get(id.0).copied()
    }

    /// Measured angle of the wheel relative to the chassis.
    pub fn joint_angle(&self, world: &PhysicsWorld, id: WheelId) -> Option<f32> {
        self.joint(id).map(|joint| world.joint_angle(joint))
    }

    /// The `(lower, upper)` lock the wheel is currently held at.
    pub fn joint_limits(&self, world: &PhysicsWorld, id: WheelId) -> Option<(f32, f32)> {
        self.joint(id).and_then(|joint| world.joint_limits(joint))
    }

    pub fn steering_response(&self) -> SteeringResponse {
        self.steering_response
    }
}

fn remove_wheels(world: &mut PhysicsWorld, wheels: &[Wheel]) {
    for wheel in wheels {
        world.remove_body(wheel.body());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WheelConfig;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn zero_g() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(1.0 / 60.0);
        world
    }

    fn square_fixture() -> Vec<f32> {
        vec![-20.0, -20.0, 20.0, -20.0, 20.0, 20.0, -20.0, 20.0]
    }

    /// One steering wheel in front, one fixed drive wheel at the back.
    fn cart(response: SteeringResponse) -> VehicleConfig {
        VehicleConfig {
            fixtures: vec![square_fixture()],
            steering_response: response,
            wheels: vec![
                WheelConfig {
                    position: Vec2::new(0.0, 15.0),
                    steering: true,
                    steering_speed: 0.5_f32.to_degrees(),
                    maximum_steering_angle: 90.0,
                    maximum_drive_force: 0.0,
                    ..WheelConfig::default()
                },
                WheelConfig::at(Vec2::new(0.0, -15.0)),
            ],
            ..VehicleConfig::default()
        }
    }

    fn all_locks(vehicle: &Vehicle, world: &PhysicsWorld) -> Vec<(f32, f32)> {
        vehicle
            .wheel_ids()
            .map(|id| vehicle.joint_limits(world, id).unwrap())
            .collect()
    }

    #[test]
    fn star_spawns_locked_straight_ahead() {
        let mut world = zero_g();
        let star = Vehicle::spawn(&mut world, &VehicleConfig::star()).unwrap();

        assert_eq!(world.body_count(), 10);
        assert_eq!(world.joint_count(), 9);
        assert_eq!(star.wheels().len(), 9);
        for id in star.wheel_ids() {
            assert_eq!(star.joint_limits(&world, id), Some((0.0, 0.0)));
            assert!(star.joint_angle(&world, id).unwrap().abs() < 1e-6);
        }
        assert!(world.local_center_of_mass(star.chassis()).length() < 1e-3);
    }

    #[test]
    fn wheels_spawn_at_their_anchors() {
        let mut world = zero_g();
        let config = VehicleConfig {
            spawn_position: Vec2::new(100.0, 50.0),
            ..cart(SteeringResponse::StepLimited)
        };
        let cart = Vehicle::spawn(&mut world, &config).unwrap();
        let (front, _) = world.body_position(cart.wheels()[0].body());
        assert_eq!(front, Vec2::new(100.0, 65.0));
        let (origin, heading) = cart.chassis_pose(&world);
        assert_eq!(origin, Vec2::new(100.0, 50.0));
        assert_eq!(heading, 0.0);
    }

    #[test]
    fn center_of_mass_is_overridden() {
        let mut world = zero_g();
        let config = VehicleConfig {
            center_of_mass: Vec2::new(0.0, -5.0),
            ..cart(SteeringResponse::StepLimited)
        };
        let cart = Vehicle::spawn(&mut world, &config).unwrap();
        let com = world.local_center_of_mass(cart.chassis());
        assert!((com - Vec2::new(0.0, -5.0)).length() < 1e-4, "com={:?}", com);
    }

    #[test]
    fn invalid_config_leaves_world_empty() {
        let mut world = zero_g();
        let mut config = cart(SteeringResponse::StepLimited);
        config.fixtures.push(vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0]);

        let err = Vehicle::spawn(&mut world, &config).unwrap_err();
        assert!(matches!(err, VehicleError::Physics(_)), "err={:?}", err);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn interpolated_steering_moves_halfway() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::Interpolate)).unwrap();

        // π is clamped to the 90° lock, then half of the way is taken.
        cart.update(&mut world, DriveCommand::Neutral, PI);
        let (lower, upper) = cart.joint_limits(&world, WheelId(0)).unwrap();
        assert!((lower - FRAC_PI_4).abs() < 1e-4, "lower={}", lower);
        assert_eq!(lower, upper);
    }

    #[test]
    fn non_steering_wheel_keeps_its_lock() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::StepLimited)).unwrap();
        for _ in 0..30 {
            cart.update(&mut world, DriveCommand::Forward, 1.0);
            world.step();
        }
        assert_eq!(cart.joint_limits(&world, WheelId(1)), Some((0.0, 0.0)));
        let (front, _) = cart.joint_limits(&world, WheelId(0)).unwrap();
        assert!(front > 0.0);
    }

    #[test]
    fn steering_converges_on_clamped_direction() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::StepLimited)).unwrap();
        for _ in 0..240 {
            cart.update(&mut world, DriveCommand::Neutral, 3.0);
            world.step();
        }
        let (lock, _) = cart.joint_limits(&world, WheelId(0)).unwrap();
        assert!((lock - FRAC_PI_2).abs() < 0.05, "lock={}", lock);
        let angle = cart.joint_angle(&world, WheelId(0)).unwrap();
        assert!((angle - FRAC_PI_2).abs() < 0.1, "angle={}", angle);
    }

    #[test]
    fn step_limited_change_never_exceeds_rate() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::StepLimited)).unwrap();
        let rate = cart.wheels()[0].steering_speed_radians();
        for _ in 0..20 {
            let before = cart.joint_angle(&world, WheelId(0)).unwrap();
            cart.update(&mut world, DriveCommand::Neutral, -1.2);
            let (lock, _) = cart.joint_limits(&world, WheelId(0)).unwrap();
            assert!((lock - before).abs() <= rate + 1e-5);
            world.step();
        }
    }

    #[test]
    fn repeated_update_at_lock_changes_nothing() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::StepLimited)).unwrap();
        let before = all_locks(&cart, &world);
        for _ in 0..3 {
            cart.update(&mut world, DriveCommand::Neutral, 0.0);
            assert_eq!(all_locks(&cart, &world), before);
        }
    }

    #[test]
    fn undriven_wheel_only_feels_drag() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::StepLimited)).unwrap();
        let front = cart.wheels()[0].body();
        let back = cart.wheels()[1].body();
        world.set_velocity(front, Vec2::new(0.0, 10.0));
        world.set_velocity(back, Vec2::new(0.0, 10.0));

        cart.update(&mut world, DriveCommand::Forward, 0.0);

        assert!((world.applied_force(front) - Vec2::new(0.0, -20.0)).length() < 1e-3);
        // Drag plus full drive force toward the 100 limit.
        assert!((world.applied_force(back) - Vec2::new(0.0, 130.0)).length() < 1e-3);
    }

    #[test]
    fn forward_command_moves_vehicle() {
        let mut world = zero_g();
        let cart = Vehicle::spawn(&mut world, &cart(SteeringResponse::StepLimited)).unwrap();
        for _ in 0..60 {
            cart.update(&mut world, DriveCommand::Forward, 0.0);
            world.step();
        }
        let (pos, _) = cart.chassis_pose(&world);
        assert!(pos.y > 0.1, "pos={:?}", pos);
    }

    #[test]
    fn idle_vehicle_still_steers() {
        let mut world = zero_g();
        let config = VehicleConfig {
            wheels: vec![WheelConfig {
                steering: true,
                steering_speed: 0.05_f32.to_degrees(),
                maximum_steering_angle: 90.0,
                maximum_drive_force: 0.0,
                ..WheelConfig::at(Vec2::new(0.0, 15.0))
            }],
            ..cart(SteeringResponse::StepLimited)
        };
        let cart = Vehicle::spawn(&mut world, &config).unwrap();
        assert_eq!(cart.steering_response(), SteeringResponse::StepLimited);
        let wheel = cart.wheel(WheelId(0)).unwrap();
        assert!(wheel.is_steering());
        assert!(cart.wheel(WheelId(1)).is_none());

        for _ in 0..300 {
            cart.update(&mut world, DriveCommand::Neutral, 0.0);
            world.step();
        }
        for _ in 0..120 {
            cart.update(&mut world, DriveCommand::Neutral, 1.0);
            world.step();
        }

        let (lock, _) = cart.joint_limits(&world, WheelId(0)).unwrap();
        let angle = cart.joint_angle(&world, WheelId(0)).unwrap();
        assert!((lock - 1.0).abs() < 1e-4, "lock={}", lock);
        assert!((angle - 1.0).abs() < 0.1, "angle={}", angle);
    }

    #[test]
    fn despawn_releases_everything() {
        let mut world = zero_g();
        let star = Vehicle::spawn(&mut world, &VehicleConfig::star()).unwrap();
        star.despawn(&mut world);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);
    }
}
