// Copyright @yucwang 2026

use crate::math::constants::Float;

use thiserror::Error;

/// Rejected camera configuration value. Raised by the setter that received it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("number of spectral sample bins cannot be less than 1")]
    SpectralSamples,
    #[error("number of spectral rays cannot be less than 1")]
    SpectralRays,
    #[error("number of spectral rays ({rays}) cannot exceed the number of spectral sample bins ({samples})")]
    RaysExceedSamples { rays: usize, samples: usize },
    #[error("pixel dimensions must both be positive, got ({width}, {height})")]
    PixelDimensions { width: usize, height: usize },
    #[error("number of pixel samples cannot be less than 1")]
    PixelSamples,
    #[error("sensitivity must be finite, got {0}")]
    Sensitivity(Float),
    #[error("extinction probability must lie in [0, 1], got {0}")]
    ExtinctionProbability(Float),
    #[error("minimum ray depth ({min}) cannot exceed maximum ray depth ({max})")]
    RayDepth { min: u32, max: u32 },
    #[error("display update interval must be a positive number of seconds, got {0}")]
    DisplayInterval(f64),
}

/// Observation requested on a camera that cannot render yet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionError {
    #[error("observer is not connected to a scene graph containing a world")]
    NotAttached,
    #[error("min wavelength ({min}) must be below max wavelength ({max})")]
    WavelengthRange { min: Float, max: Float },
}

/// Failure while generating or tracing the rays of one pixel sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    #[error("ray generation failed at pixel ({x}, {y}): {reason}")]
    RayGeneration { x: usize, y: usize, reason: String },
    #[error("ray generator produced {got} rays, expected {expected}")]
    RayCount { expected: usize, got: usize },
    #[error("tracing failed: {0}")]
    Tracer(String),
    #[error("tracer returned a spectrum with {got} bins, expected {expected}")]
    SpectrumSize { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("pixel ({x}, {y}): {source}")]
    Tracing { x: usize, y: usize, #[source] source: TraceError },
    #[error("sampling panicked at pixel ({x}, {y}): {message}")]
    PixelPanicked { x: usize, y: usize, message: String },
    #[error("render thread pool failed: {message}")]
    PoolPanicked { message: String },
    #[error("all render workers exited with {missing} results outstanding")]
    WorkerDisconnected { missing: usize },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write exr: {0}")]
    Exr(#[from] exr::error::Error),
    #[error("unsupported output path: {0}")]
    UnsupportedPath(String),
}
