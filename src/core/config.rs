// Copyright @yucwang 2026

use crate::core::error::{ConfigError, PreconditionError};
use crate::math::constants::{Float, DEFAULT_MAX_WAVELENGTH, DEFAULT_MIN_WAVELENGTH};

use std::thread;
use std::time::Duration;

/// Mutable camera configuration. Every setter validates eagerly; nothing is clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pixels: (usize, usize),
    sensitivity: Float,
    spectral_samples: usize,
    spectral_rays: usize,
    pixel_samples: usize,
    process_count: usize,
    pub min_wavelength: Float,
    pub max_wavelength: Float,
    extinction_prob: Float,
    min_depth: u32,
    max_depth: u32,
    pub accumulate: bool,
    pub display_progress: bool,
    display_update_time: f64,
    pub seed: Option<u64>,
    pixels_changed: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pixels: (512, 512),
            sensitivity: 1.0,
            spectral_samples: 21,
            spectral_rays: 1,
            pixel_samples: 100,
            process_count: 0,
            min_wavelength: DEFAULT_MIN_WAVELENGTH,
            max_wavelength: DEFAULT_MAX_WAVELENGTH,
            extinction_prob: 0.1,
            min_depth: 3,
            max_depth: 100,
            accumulate: false,
            display_progress: true,
            display_update_time: 10.0,
            seed: None,
            pixels_changed: false,
        }
    }
}

impl CameraConfig {
    pub fn new(pixels: (usize, usize),
               sensitivity: Float,
               spectral_samples: usize,
               spectral_rays: usize,
               pixel_samples: usize,
               process_count: usize) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.set_pixels(pixels)?;
        config.set_sensitivity(sensitivity)?;
        config.set_spectral(spectral_samples, spectral_rays)?;
        config.set_pixel_samples(pixel_samples)?;
        config.set_process_count(process_count);
        Ok(config)
    }

    pub fn pixels(&self) -> (usize, usize) {
        self.pixels
    }

    pub fn set_pixels(&mut self, pixels: (usize, usize)) -> Result<(), ConfigError> {
        if pixels.0 == 0 || pixels.1 == 0 {
            return Err(ConfigError::PixelDimensions { width: pixels.0, height: pixels.1 });
        }
        self.pixels = pixels;
        self.pixels_changed = true;
        Ok(())
    }

    /// Whether `set_pixels` succeeded since the last call. Clears the flag.
    pub fn take_pixels_changed(&mut self) -> bool {
        std::mem::replace(&mut self.pixels_changed, false)
    }

    pub fn sensitivity(&self) -> Float {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: Float) -> Result<(), ConfigError> {
        if !sensitivity.is_finite() {
            return Err(ConfigError::Sensitivity(sensitivity));
        }
        self.sensitivity = sensitivity;
        Ok(())
    }

    pub fn spectral_samples(&self) -> usize {
        self.spectral_samples
    }

    pub fn spectral_rays(&self) -> usize {
        self.spectral_rays
    }

    pub fn set_spectral_samples(&mut self, spectral_samples: usize) -> Result<(), ConfigError> {
        self.set_spectral(spectral_samples, self.spectral_rays)
    }

    pub fn set_spectral_rays(&mut self, spectral_rays: usize) -> Result<(), ConfigError> {
        self.set_spectral(self.spectral_samples, spectral_rays)
    }

    /// Sets both counts at once, so a change that lowers the bin count below
    /// the current ray count can be expressed in one step.
    pub fn set_spectral(&mut self, spectral_samples: usize, spectral_rays: usize) -> Result<(), ConfigError> {
        if spectral_samples < 1 {
            return Err(ConfigError::SpectralSamples);
        }
        if spectral_rays < 1 {
            return Err(ConfigError::SpectralRays);
        }
        if spectral_rays > spectral_samples {
            return Err(ConfigError::RaysExceedSamples { rays: spectral_rays, samples: spectral_samples });
        }
        self.spectral_samples = spectral_samples;
        self.spectral_rays = spectral_rays;
        Ok(())
    }

    pub fn pixel_samples(&self) -> usize {
        self.pixel_samples
    }

    pub fn set_pixel_samples(&mut self, pixel_samples: usize) -> Result<(), ConfigError> {
        if pixel_samples < 1 {
            return Err(ConfigError::PixelSamples);
        }
        self.pixel_samples = pixel_samples;
        Ok(())
    }

    /// Configured worker count; 0 selects every available hardware thread.
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    pub fn set_process_count(&mut self, process_count: usize) {
        self.process_count = process_count;
    }

    pub fn extinction_prob(&self) -> Float {
        self.extinction_prob
    }

    pub fn set_extinction_prob(&mut self, extinction_prob: Float) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&extinction_prob) {
            return Err(ConfigError::ExtinctionProbability(extinction_prob));
        }
        self.extinction_prob = extinction_prob;
        Ok(())
    }

    pub fn ray_depth(&self) -> (u32, u32) {
        (self.min_depth, self.max_depth)
    }

    pub fn set_ray_depth(&mut self, min_depth: u32, max_depth: u32) -> Result<(), ConfigError> {
        if min_depth > max_depth {
            return Err(ConfigError::RayDepth { min: min_depth, max: max_depth });
        }
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        Ok(())
    }

    pub fn display_update_time(&self) -> f64 {
        self.display_update_time
    }

    pub fn set_display_update_time(&mut self, seconds: f64) -> Result<(), ConfigError> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(ConfigError::DisplayInterval(seconds));
        }
        self.display_update_time = seconds;
        Ok(())
    }

    /// Freeze the configuration for one observation.
    pub fn settings(&self) -> Result<RenderSettings, PreconditionError> {
        if self.min_wavelength >= self.max_wavelength {
            return Err(PreconditionError::WavelengthRange {
                min: self.min_wavelength,
                max: self.max_wavelength,
            });
        }

        let process_count = match self.process_count {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        };

        Ok(RenderSettings {
            width: self.pixels.0,
            height: self.pixels.1,
            sensitivity: self.sensitivity,
            spectral_samples: self.spectral_samples,
            spectral_rays: self.spectral_rays,
            pixel_samples: self.pixel_samples,
            process_count,
            min_wavelength: self.min_wavelength,
            max_wavelength: self.max_wavelength,
            extinction_prob: self.extinction_prob,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            display_progress: self.display_progress,
            display_update_time: Duration::from_secs_f64(self.display_update_time),
            seed: self.seed,
        })
    }
}

/// Read-only snapshot of `CameraConfig` taken at the start of `observe()`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub sensitivity: Float,
    pub spectral_samples: usize,
    pub spectral_rays: usize,
    pub pixel_samples: usize,
    pub process_count: usize,
    pub min_wavelength: Float,
    pub max_wavelength: Float,
    pub extinction_prob: Float,
    pub min_depth: u32,
    pub max_depth: u32,
    pub display_progress: bool,
    pub display_update_time: Duration,
    pub seed: Option<u64>,
}

impl RenderSettings {
    pub fn total_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Samples contributed to every pixel by one observation.
    pub fn samples_per_observation(&self) -> usize {
        self.pixel_samples * self.spectral_rays
    }
}
