// Copyright @yucwang 2026

use crate::core::error::TraceError;
use crate::core::ray_template::SpectralRay;
use crate::core::scene::{TraceSample, World};
use crate::math::constants::Float;
use crate::math::spectrum::Spectrum;

use rand::RngCore;

/// Every ray escapes into a uniform emitter of fixed spectral radiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantWorld {
    radiance: Float,
}

impl ConstantWorld {
    pub fn new(radiance: Float) -> Self {
        Self { radiance }
    }
}

impl World for ConstantWorld {
    fn trace(&self, ray: &SpectralRay, _rng: &mut dyn RngCore) -> Result<TraceSample, TraceError> {
        let t = &ray.template;
        Ok(TraceSample {
            spectrum: Spectrum::from_fn(t.min_wavelength, t.max_wavelength, t.num_samples, |_| self.radiance),
            ray_count: 1,
        })
    }

    fn describe(&self) -> String {
        format!("ConstantWorld\n  radiance: {}", self.radiance)
    }
}
