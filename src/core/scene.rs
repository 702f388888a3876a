// Copyright @yucwang 2026

use crate::core::error::TraceError;
use crate::core::ray_template::SpectralRay;
use crate::math::spectrum::Spectrum;
use crate::math::transform::Transform;

use rand::RngCore;
use std::sync::Arc;

/// Result of tracing one spectral ray through the world.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSample {
    pub spectrum: Spectrum,
    /// Ray segments traced internally, for statistics only.
    pub ray_count: u64,
}

/// Root of a scene graph. Owns the light transport the camera delegates to.
pub trait World: Send + Sync {
    fn trace(&self, ray: &SpectralRay, rng: &mut dyn RngCore) -> Result<TraceSample, TraceError>;

    fn describe(&self) -> String {
        String::from("World")
    }
}

#[derive(Clone)]
pub enum Parent {
    World(Arc<dyn World>),
    Node(Arc<SceneNode>),
}

/// A transform in the scene graph, optionally parented to the world or to
/// another node.
#[derive(Clone, Default)]
pub struct SceneNode {
    parent: Option<Parent>,
    transform: Transform,
}

impl SceneNode {
    pub fn new(parent: Option<Parent>, transform: Transform) -> Self {
        Self { parent, transform }
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<Parent>) {
        self.parent = parent;
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// The world this node is attached to, if the parent chain reaches one.
    pub fn root(&self) -> Option<Arc<dyn World>> {
        match self.parent.as_ref()? {
            Parent::World(world) => Some(Arc::clone(world)),
            Parent::Node(node) => node.root(),
        }
    }

    /// Local-to-root transform, composed along the parent chain.
    pub fn to_root(&self) -> Transform {
        match &self.parent {
            Some(Parent::Node(node)) => node.to_root() * self.transform,
            _ => self.transform,
        }
    }
}
