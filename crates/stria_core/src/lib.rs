//! Stria Core Runtime
//!
//! This crate provides the seams between the trail renderer and its
//! collaborators:
//!
//! - **Control Events**: a command channel carrying discrete UI events
//!   (pause, clear, shape-mode switches) into the frame scheduler
//! - **Input Snapshots**: the per-tick poll of cursor and key state
//! - **Configuration**: the clamped settings snapshot and its TOML
//!   persistence

pub mod config;
pub mod error;
pub mod events;
pub mod input;

pub use config::{ColorStopConfig, KeyChoice, ShapeMode, TrailConfig};
pub use error::ConfigError;
pub use events::{ControlEvent, ControlQueue, ControlSender};
pub use input::{InputSnapshot, InputSource, ScriptedInput};
