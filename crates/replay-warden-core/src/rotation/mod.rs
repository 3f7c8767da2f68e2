mod control;
mod engine;
mod registry;

pub use {
    control::{ReplayControl, start_command, stop_command},
    engine::RotationEngine,
    registry::TimerRegistry,
};
