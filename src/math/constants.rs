/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;

pub type Vector3f = na::Vector3<Float>;
pub type Matrix3f = na::Matrix3<Float>;
pub type Matrix4f = na::Matrix4<Float>;
pub type VectorXf = na::DVector<Float>;

// Visible range sampled by default, in nanometres.
pub const DEFAULT_MIN_WAVELENGTH: Float = 375.0;
pub const DEFAULT_MAX_WAVELENGTH: Float = 740.0;
