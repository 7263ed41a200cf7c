use glam::Vec2;

use crate::input::queue::InputEvent;
use crate::vehicle::wheel::DriveCommand;

pub const KEY_W: u32 = 87;
pub const KEY_S: u32 = 83;
pub const KEY_ARROW_UP: u32 = 38;
pub const KEY_ARROW_DOWN: u32 = 40;

/// Latest pointer position plus the drive keys currently held.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    pointer: Option<Vec2>,
    pointer_down: bool,
    forward_held: bool,
    backward_held: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } => self.pointer = Some(Vec2::new(x, y)),
            InputEvent::PointerDown { x, y } => {
                self.pointer = Some(Vec2::new(x, y));
                self.pointer_down = true;
            }
            InputEvent::PointerUp { x, y } => {
                self.pointer = Some(Vec2::new(x, y));
                self.pointer_down = false;
            }
            InputEvent::KeyDown { key_code } => self.set_key(key_code, true),
            InputEvent::KeyUp { key_code } => self.set_key(key_code, false),
        }
    }

    fn set_key(&mut self, key_code: u32, held: bool) {
        match key_code {
            KEY_W | KEY_ARROW_UP => self.forward_held = held,
            KEY_S | KEY_ARROW_DOWN => self.backward_held = held,
            _ => {}
        }
    }

    /// Last known pointer position in world space, if any was seen.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Forward and backward cancel out.
    pub fn drive_command(&self) -> DriveCommand {
        match (self.forward_held, self.backward_held) {
            (true, false) => DriveCommand::Forward,
            (false, true) => DriveCommand::Backward,
            _ => DriveCommand::Neutral,
        }
    }
}
