// Copyright @yucwang 2021

pub mod parallel;
pub mod renderer;
pub mod serial;

pub use parallel::ParallelRenderer;
pub use renderer::{RenderJob, Renderer};
pub use serial::SerialRenderer;
