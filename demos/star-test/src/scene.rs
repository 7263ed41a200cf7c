use glam::Vec2;
use rig_engine::{
    direction_to_target, ControlState, InputQueue, PhysicsWorld, SceneConfig, StepClock, Vehicle,
    VehicleConfig, VehicleError,
};

/// One vehicle in an empty top-down world, steered toward the pointer.
pub struct StarScene {
    world: PhysicsWorld,
    vehicle: Vehicle,
    controls: ControlState,
    clock: StepClock,
}

impl StarScene {
    pub fn new(scene: SceneConfig, vehicle: VehicleConfig) -> Result<Self, VehicleError> {
        let mut world = PhysicsWorld::new(scene.gravity);
        world.set_dt(scene.fixed_dt);
        let vehicle = Vehicle::spawn(&mut world, &vehicle)?;
        log::info!(
            "Star scene ready: {} bodies, {} joints",
            world.body_count(),
            world.joint_count()
        );
        Ok(Self {
            world,
            vehicle,
            controls: ControlState::new(),
            clock: StepClock::new(scene.fixed_dt, scene.max_steps_per_frame),
        })
    }

    /// Fold pending input, then run however many fixed ticks the frame owes.
    /// Returns the number of ticks run.
    pub fn frame(&mut self, frame_dt: f32, input: &mut InputQueue) -> u32 {
        for event in input.drain() {
            self.controls.apply(&event);
        }

        let steps = self.clock.advance(frame_dt);
        for _ in 0..steps {
            self.tick();
        }
        steps
    }

    fn tick(&mut self) {
        let (position, heading) = self.vehicle.chassis_pose(&self.world);
        let target = self.controls.pointer().unwrap_or(position);
        let direction = direction_to_target(position, heading, target);
        self.vehicle
            .update(&mut self.world, self.controls.drive_command(), direction);
        self.world.step();
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    /// Current lock angle of every wheel joint, in wheel order.
    pub fn wheel_angles(&self) -> Vec<f32> {
        self.vehicle
            .wheel_ids()
            .map(|id| {
                self.vehicle
                    .joint_limits(&self.world, id)
                    .map_or(0.0, |(lower, _)| lower)
            })
            .collect()
    }

    pub fn chassis_position(&self) -> Vec2 {
        self.vehicle.chassis_pose(&self.world).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_engine::InputEvent;
    use rig_engine::input::controls::KEY_W;

    fn scene() -> StarScene {
        StarScene::new(SceneConfig::default(), VehicleConfig::star()).unwrap()
    }

    #[test]
    fn builds_star_vehicle() {
        let scene = scene();
        assert_eq!(scene.world().body_count(), 10);
        assert_eq!(scene.world().joint_count(), 9);
        assert!(scene.wheel_angles().iter().all(|a| *a == 0.0));
    }

    #[test]
    fn frame_runs_fixed_ticks() {
        let mut scene = scene();
        let mut input = InputQueue::new();
        assert_eq!(scene.frame(1.0 / 60.0, &mut input), 1);
        assert_eq!(scene.frame(0.0, &mut input), 0);
        assert_eq!(scene.clock().ticks(), 1);
    }

    #[test]
    fn no_pointer_keeps_wheels_straight() {
        let mut scene = scene();
        let mut input = InputQueue::new();
        for _ in 0..30 {
            scene.frame(1.0 / 60.0, &mut input);
        }
        assert!(scene.wheel_angles().iter().all(|a| a.abs() < 1e-4));
    }

    #[test]
    fn pointer_turns_rim_wheels() {
        let mut scene = scene();
        let mut input = InputQueue::new();
        input.push(InputEvent::PointerMove { x: 200.0, y: 0.0 });
        scene.frame(1.0 / 60.0, &mut input);
        assert!(input.is_empty());

        // Target lies to the right of the initial heading, so every wheel
        // steers the same way by one step.
        let angles = scene.wheel_angles();
        assert!(angles.iter().all(|a| *a < 0.0), "angles={:?}", angles);
    }

    #[test]
    fn forward_key_moves_chassis() {
        let mut scene = scene();
        let mut input = InputQueue::new();
        input.push(InputEvent::PointerMove { x: 0.0, y: 1000.0 });
        input.push(InputEvent::KeyDown { key_code: KEY_W });
        for _ in 0..60 {
            scene.frame(1.0 / 60.0, &mut input);
        }
        assert!(scene.chassis_position().y > 0.1, "pos={:?}", scene.chassis_position());
    }
}
