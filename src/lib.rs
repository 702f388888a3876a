// Copyright @yucwang 2021

pub extern crate nalgebra as na;

pub mod core;
pub mod io;
pub mod math;
pub mod renderers;
pub mod sensors;
pub mod worlds;

#[cfg(test)]
mod fixtures;

pub use crate::core::camera::Camera;
pub use crate::core::config::{CameraConfig, RenderSettings};
pub use crate::core::error::{ConfigError, OutputError, PreconditionError, RenderError, TraceError};
pub use crate::core::scene::{Parent, SceneNode, World};
pub use crate::core::sensor::RayGenerator;
