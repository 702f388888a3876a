// Copyright @yucwang 2026

//! Deterministic collaborators for render-loop tests.

use crate::core::color::{ColorMatchingTable, ColorPipeline};
use crate::core::error::TraceError;
use crate::core::ray_template::{RayTemplate, SpectralRay};
use crate::core::scene::{TraceSample, World};
use crate::core::sensor::{PixelRequest, RayGenerator};
use crate::math::constants::{Float, Vector3f, VectorXf};
use crate::math::spectrum::Spectrum;

use rand::RngCore;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One ray per sample from `(x, y, 0)` heading down +z. Counts calls.
#[derive(Default)]
pub struct PixelOriginGenerator {
    pub calls: AtomicUsize,
}

impl RayGenerator for PixelOriginGenerator {
    fn generate_rays(&self,
                     request: &PixelRequest,
                     template: &RayTemplate,
                     _rng: &mut dyn RngCore) -> Result<Vec<SpectralRay>, TraceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let origin = Vector3f::new(request.x as Float, request.y as Float, 0.0);
        Ok((0..request.samples)
            .map(|_| template.spawn(origin, Vector3f::new(0.0, 0.0, 1.0)))
            .collect())
    }
}

/// Radiance depends only on the pixel the ray started from, the bin
/// wavelength and the current pass number.
#[derive(Default)]
pub struct PixelValueWorld {
    pub pass: AtomicUsize,
    pub fail_at: Option<(usize, usize)>,
    pub panic_at: Option<(usize, usize)>,
}

impl PixelValueWorld {
    pub fn failing_at(x: usize, y: usize) -> Self {
        Self { fail_at: Some((x, y)), ..Self::default() }
    }

    pub fn panicking_at(x: usize, y: usize) -> Self {
        Self { panic_at: Some((x, y)), ..Self::default() }
    }

    pub fn radiance(x: usize, y: usize, pass: usize, wavelength: Float) -> Float {
        (1.0 + x as Float + 10.0 * y as Float) * (pass + 1) as Float * (wavelength / 500.0)
    }
}

impl World for PixelValueWorld {
    fn trace(&self, ray: &SpectralRay, _rng: &mut dyn RngCore) -> Result<TraceSample, TraceError> {
        let origin = ray.ray.origin();
        let pixel = (origin.x.round() as usize, origin.y.round() as usize);
        if self.fail_at == Some(pixel) {
            return Err(TraceError::Tracer(format!("no light at {:?}", pixel)));
        }
        if self.panic_at == Some(pixel) {
            panic!("tracer blew up at {:?}", pixel);
        }

        let pass = self.pass.load(Ordering::SeqCst);
        let t = &ray.template;
        let spectrum = Spectrum::from_fn(t.min_wavelength, t.max_wavelength, t.num_samples, |wavelength| {
            Self::radiance(pixel.0, pixel.1, pass, wavelength)
        });
        Ok(TraceSample { spectrum, ray_count: 2 })
    }
}

/// Flat unit radiance.
pub struct UnitWorld;

impl World for UnitWorld {
    fn trace(&self, ray: &SpectralRay, _rng: &mut dyn RngCore) -> Result<TraceSample, TraceError> {
        let t = &ray.template;
        Ok(TraceSample {
            spectrum: Spectrum::from_fn(t.min_wavelength, t.max_wavelength, t.num_samples, |_| 1.0),
            ray_count: 1,
        })
    }
}

/// Tristimulus is the plain bin sum on every axis; display halves it.
pub struct SumPipeline;

impl ColorPipeline for SumPipeline {
    fn resample(&self, _min_wavelength: Float, _max_wavelength: Float, num_samples: usize) -> ColorMatchingTable {
        ColorMatchingTable {
            x: VectorXf::from_element(num_samples, 1.0),
            y: VectorXf::from_element(num_samples, 1.0),
            z: VectorXf::from_element(num_samples, 1.0),
        }
    }

    fn to_display(&self, tristimulus: &Vector3f) -> Vector3f {
        tristimulus * 0.5
    }
}
