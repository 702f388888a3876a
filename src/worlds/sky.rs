// Copyright @yucwang 2026

use crate::core::error::TraceError;
use crate::core::ray_template::SpectralRay;
use crate::core::scene::{TraceSample, World};
use crate::math::constants::Float;
use crate::math::spectrum::Spectrum;

use rand::RngCore;

const REFERENCE_WAVELENGTH: Float = 550.0;

/// Open sky: a flat horizon glow blended towards a Rayleigh-tinted zenith
/// (radiance falling off as wavelength^-4) by the ray's elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyWorld {
    pub horizon: Float,
    pub zenith: Float,
}

impl Default for SkyWorld {
    fn default() -> Self {
        Self { horizon: 1.0, zenith: 1.5 }
    }
}

impl SkyWorld {
    pub fn radiance(&self, wavelength: Float, elevation: Float) -> Float {
        let t = (0.5 * (elevation + 1.0)).max(0.0).min(1.0);
        let rayleigh = (REFERENCE_WAVELENGTH / wavelength).powi(4);
        (1.0 - t) * self.horizon + t * self.zenith * rayleigh
    }
}

impl World for SkyWorld {
    fn trace(&self, ray: &SpectralRay, _rng: &mut dyn RngCore) -> Result<TraceSample, TraceError> {
        let t = &ray.template;
        let elevation = ray.ray.dir().y;
        if !elevation.is_finite() {
            return Err(TraceError::Tracer(String::from("degenerate ray direction")));
        }

        Ok(TraceSample {
            spectrum: Spectrum::from_fn(t.min_wavelength, t.max_wavelength, t.num_samples,
                                        |wavelength| self.radiance(wavelength, elevation)),
            ray_count: 1,
        })
    }

    fn describe(&self) -> String {
        format!("SkyWorld\n  horizon: {}\n  zenith: {}", self.horizon, self.zenith)
    }
}
