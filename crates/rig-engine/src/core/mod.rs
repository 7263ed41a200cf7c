pub mod collision;
pub mod physics;
pub mod time;
