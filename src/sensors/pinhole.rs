// Copyright @yucwang 2026

use crate::core::error::TraceError;
use crate::core::ray_template::{RayTemplate, SpectralRay};
use crate::core::sensor::{PixelRequest, RayGenerator};
use crate::math::constants::{Float, Vector3f};

use rand::{Rng, RngCore};

/// Pinhole projection in camera-local space: eye at the origin, looking
/// down +z with +y up. Each sample is jittered across the pixel footprint.
pub struct PinholeRayGenerator {
    tan_half_fov_y: Float,
}

impl PinholeRayGenerator {
    pub fn new(fov_y_degrees: Float) -> Self {
        Self { tan_half_fov_y: (0.5 * fov_y_degrees.to_radians()).tan() }
    }

    fn direction(&self, request: &PixelRequest, u: Float, v: Float) -> Vector3f {
        let aspect = request.width as Float / request.height as Float;
        let sx = (request.x as Float + u) / request.width as Float;
        let sy = (request.y as Float + v) / request.height as Float;

        let px = (2.0 * sx - 1.0) * aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * sy) * self.tan_half_fov_y;
        Vector3f::new(px, py, 1.0)
    }
}

impl Default for PinholeRayGenerator {
    fn default() -> Self {
        Self::new(45.0)
    }
}

impl RayGenerator for PinholeRayGenerator {
    fn generate_rays(&self,
                     request: &PixelRequest,
                     template: &RayTemplate,
                     rng: &mut dyn RngCore) -> Result<Vec<SpectralRay>, TraceError> {
        if request.x >= request.width || request.y >= request.height {
            return Err(TraceError::RayGeneration {
                x: request.x,
                y: request.y,
                reason: format!("outside {}x{} frame", request.width, request.height),
            });
        }

        let origin = Vector3f::zeros();
        let rays = (0..request.samples)
            .map(|_| {
                let u: Float = rng.gen();
                let v: Float = rng.gen();
                template.spawn(origin, self.direction(request, u, v))
            })
            .collect();
        Ok(rays)
    }

    fn describe(&self) -> String {
        format!("PinholeRayGenerator\n  tan_half_fov_y: {}", self.tan_half_fov_y)
    }
}
