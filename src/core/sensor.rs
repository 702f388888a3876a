// Copyright @yucwang 2026

use crate::core::error::TraceError;
use crate::core::ray_template::{RayTemplate, SpectralRay};

use rand::RngCore;

/// The pixel a ray generator is asked to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRequest {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub samples: usize,
}

/// Camera model hook: produce `request.samples` rays in camera-local space
/// for one pixel and one spectral channel.
pub trait RayGenerator: Send + Sync {
    fn generate_rays(&self,
                     request: &PixelRequest,
                     template: &RayTemplate,
                     rng: &mut dyn RngCore) -> Result<Vec<SpectralRay>, TraceError>;

    fn describe(&self) -> String {
        String::from("RayGenerator")
    }
}
