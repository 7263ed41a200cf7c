use std::process::ExitCode;

use glam::Vec2;
use rig_engine::input::controls::KEY_W;
use rig_engine::{InputEvent, InputQueue, SceneConfig, VehicleConfig, VehicleError};

mod scene;
use scene::StarScene;

const FRAMES: u32 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;
const ORBIT_RADIUS: f32 = 400.0;
/// Pointer orbit speed in radians per second.
const ORBIT_SPEED: f32 = 0.5;
const LOG_EVERY: u32 = 60;

fn load_vehicle() -> Result<VehicleConfig, VehicleError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading vehicle from {}", path);
            VehicleConfig::from_file(&path)
        }
        None => Ok(VehicleConfig::star()),
    }
}

fn run() -> Result<(), VehicleError> {
    let mut scene = StarScene::new(SceneConfig::default(), load_vehicle()?)?;
    let mut input = InputQueue::new();
    input.push(InputEvent::KeyDown { key_code: KEY_W });

    for frame in 0..FRAMES {
        let t = frame as f32 * FRAME_DT;
        let pointer = scene.chassis_position() + Vec2::from_angle(t * ORBIT_SPEED) * ORBIT_RADIUS;
        input.push(InputEvent::PointerMove { x: pointer.x, y: pointer.y });
        scene.frame(FRAME_DT, &mut input);

        if frame % LOG_EVERY == 0 {
            let angles: Vec<String> = scene
                .wheel_angles()
                .iter()
                .map(|a| format!("{:.1}", a.to_degrees()))
                .collect();
            log::info!(
                "t={:.2}s chassis={:?} wheels=[{}]",
                scene.clock().elapsed(),
                scene.chassis_position(),
                angles.join(", ")
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
