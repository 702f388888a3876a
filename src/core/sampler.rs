// Copyright @yucwang 2026

use crate::core::error::TraceError;
use crate::core::ray_template::RayTemplate;
use crate::core::scene::World;
use crate::core::sensor::{PixelRequest, RayGenerator};
use crate::math::constants::Float;
use crate::math::spectrum::Spectrum;
use crate::math::transform::Transform;

use rand::RngCore;

/// Estimates the spectrum seen by one pixel for one channel.
///
/// Borrowed by every render thread; holds no mutable state.
pub struct PixelSampler<'a> {
    generator: &'a dyn RayGenerator,
    world: &'a dyn World,
    to_world: Transform,
    width: usize,
    height: usize,
    pixel_samples: usize,
    sensitivity: Float,
}

impl<'a> PixelSampler<'a> {
    pub fn new(generator: &'a dyn RayGenerator,
               world: &'a dyn World,
               to_world: Transform,
               pixels: (usize, usize),
               pixel_samples: usize,
               sensitivity: Float) -> Self {
        Self {
            generator,
            world,
            to_world,
            width: pixels.0,
            height: pixels.1,
            pixel_samples,
            sensitivity,
        }
    }

    /// Trace `pixel_samples` rays through pixel `(x, y)` and return the mean
    /// spectrum scaled by the camera sensitivity, with the number of ray
    /// segments traced. Any failure aborts the whole pixel.
    pub fn sample(&self,
                  x: usize,
                  y: usize,
                  template: &RayTemplate,
                  rng: &mut dyn RngCore) -> Result<(Spectrum, u64), TraceError> {
        let request = PixelRequest {
            x,
            y,
            width: self.width,
            height: self.height,
            samples: self.pixel_samples,
        };
        let rays = self.generator.generate_rays(&request, template, rng)?;
        if rays.len() != self.pixel_samples {
            return Err(TraceError::RayCount { expected: self.pixel_samples, got: rays.len() });
        }

        let mut spectrum = template.new_spectrum();
        let weight = 1.0 / self.pixel_samples as Float;
        let mut ray_count = 0u64;

        for ray in rays.iter() {
            let world_ray = ray.transformed(&self.to_world);
            let sample = self.world.trace(&world_ray, rng)?;
            if sample.spectrum.num_samples() != template.num_samples {
                return Err(TraceError::SpectrumSize {
                    expected: template.num_samples,
                    got: sample.spectrum.num_samples(),
                });
            }

            spectrum.add_weighted(weight, &sample.spectrum);
            ray_count += sample.ray_count;
        }

        spectrum.scale(self.sensitivity);
        Ok((spectrum, ray_count))
    }
}
