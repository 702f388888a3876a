// Copyright @yucwang 2021

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod progress;
pub mod ray_template;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod sensor;
