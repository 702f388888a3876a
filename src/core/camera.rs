// Copyright @yucwang 2026

use crate::core::color::{CieColorPipeline, ColorPipeline};
use crate::core::config::CameraConfig;
use crate::core::error::{ConfigError, OutputError, PreconditionError, RenderError};
use crate::core::frame::FrameAccumulator;
use crate::core::progress::RenderSink;
use crate::core::ray_template::generate_ray_templates;
use crate::core::sampler::PixelSampler;
use crate::core::scene::{Parent, SceneNode};
use crate::core::sensor::RayGenerator;
use crate::io::image_utils;
use crate::io::sinks::LogSink;
use crate::math::transform::Transform;
use crate::renderers::{ParallelRenderer, RenderJob, Renderer, SerialRenderer};

use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::Arc;

/// Progressive spectral camera observer.
///
/// Each `observe()` traces `pixel_samples` rays per pixel for every spectral
/// channel and folds the result into a running tristimulus estimate. With
/// `accumulate` set, successive observations refine the same estimate.
pub struct Camera {
    config: CameraConfig,
    node: SceneNode,
    generator: Arc<dyn RayGenerator>,
    color: Arc<dyn ColorPipeline>,
    frame: FrameAccumulator,
    sink: Box<dyn RenderSink>,
}

impl Camera {
    pub fn new(mut config: CameraConfig, generator: Arc<dyn RayGenerator>) -> Self {
        config.take_pixels_changed();
        let (width, height) = config.pixels();
        Self {
            config,
            node: SceneNode::default(),
            generator,
            color: Arc::new(CieColorPipeline::new()),
            frame: FrameAccumulator::new(width, height),
            sink: Box::new(LogSink::default()),
        }
    }

    pub fn with_color_pipeline(mut self, color: Arc<dyn ColorPipeline>) -> Self {
        self.color = color;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn RenderSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn attach(&mut self, parent: Parent) {
        self.node.set_parent(Some(parent));
    }

    pub fn detach(&mut self) {
        self.node.set_parent(None);
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.node.set_transform(transform);
    }

    pub fn node(&self) -> &SceneNode {
        &self.node
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Mutable access to the configuration. Any pixel assignment made
    /// through the returned guard resets the frame when the guard drops.
    pub fn config_mut(&mut self) -> ConfigMut<'_> {
        ConfigMut { config: &mut self.config, frame: &mut self.frame }
    }

    /// Resize the frame. Clears both buffers and the sample count.
    pub fn set_pixels(&mut self, pixels: (usize, usize)) -> Result<(), ConfigError> {
        self.config_mut().set_pixels(pixels)
    }

    pub fn frame(&self) -> &FrameAccumulator {
        &self.frame
    }

    pub fn accumulated_samples(&self) -> usize {
        self.frame.accumulated_samples()
    }

    /// Render the attached world into the frame buffers.
    ///
    /// On failure the frame is left exactly as it was before the call.
    pub fn observe(&mut self) -> Result<(), RenderError> {
        let world = self.node.root().ok_or(PreconditionError::NotAttached)?;
        let settings = self.config.settings()?;

        if !self.config.accumulate || self.frame.dimensions() != (settings.width, settings.height) {
            self.frame.reset(settings.width, settings.height);
        }

        log::debug!("{}", self.generator.describe());
        log::debug!("{}", world.describe());

        let templates = generate_ray_templates(&settings);
        for (channel, template) in templates.iter().enumerate() {
            log::debug!("channel {}: {:.1}-{:.1}nm, {} bins",
                        channel, template.min_wavelength, template.max_wavelength, template.num_samples);
        }

        let new_samples = settings.samples_per_observation();
        let previous = self.frame.clone();
        self.frame.begin_observation(new_samples);

        let job = RenderJob {
            settings: &settings,
            templates: &templates,
            sampler: PixelSampler::new(self.generator.as_ref(),
                                       world.as_ref(),
                                       self.node.to_root(),
                                       (settings.width, settings.height),
                                       settings.pixel_samples,
                                       settings.sensitivity),
            color: self.color.as_ref(),
        };

        log::info!("Rendering {}x{} px, {} spectral rays, {} samples/px on {} worker(s).",
                   settings.width, settings.height, settings.spectral_rays,
                   settings.pixel_samples, settings.process_count);

        let result = if settings.process_count == 1 {
            SerialRenderer.render(&job, &mut self.frame, self.sink.as_mut())
        } else {
            ParallelRenderer::new(settings.process_count).render(&job, &mut self.frame, self.sink.as_mut())
        };

        if let Err(err) = result {
            log::warn!("Render aborted: {}.", err);
            self.frame = previous;
            return Err(err);
        }

        self.frame.end_observation(new_samples);
        Ok(())
    }

    /// Push the current display buffer to the sink.
    pub fn display(&mut self) {
        self.sink.on_frame_update(self.frame.display());
    }

    /// Write the display buffer; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OutputError> {
        image_utils::save_bitmap(self.frame.display(), path.as_ref())
    }
}

/// Borrow of a camera's configuration that keeps the frame in step with
/// the configured pixel size.
pub struct ConfigMut<'a> {
    config: &'a mut CameraConfig,
    frame: &'a mut FrameAccumulator,
}

impl Deref for ConfigMut<'_> {
    type Target = CameraConfig;

    fn deref(&self) -> &CameraConfig {
        self.config
    }
}

impl DerefMut for ConfigMut<'_> {
    fn deref_mut(&mut self) -> &mut CameraConfig {
        self.config
    }
}

impl Drop for ConfigMut<'_> {
    fn drop(&mut self) {
        if self.config.take_pixels_changed() {
            let (width, height) = self.config.pixels();
            self.frame.reset(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TraceError;
    use crate::core::progress::NullSink;
    use crate::core::scene::World;
    use crate::fixtures::{PixelOriginGenerator, PixelValueWorld, SumPipeline};
    use crate::math::bitmap::Bitmap;
    use std::sync::atomic::Ordering;

    fn camera_with(world: Arc<PixelValueWorld>,
                   generator: Arc<PixelOriginGenerator>,
                   processes: usize,
                   color: Arc<dyn ColorPipeline>) -> Camera {
        let mut config = CameraConfig::new((5, 3), 1.5, 7, 3, 4, processes).unwrap();
        config.min_wavelength = 400.0;
        config.max_wavelength = 700.0;
        config.seed = Some(11);
        config.display_progress = false;

        let mut camera = Camera::new(config, generator)
            .with_color_pipeline(color)
            .with_sink(Box::new(NullSink));
        let world: Arc<dyn World> = world;
        camera.attach(Parent::World(world));
        camera
    }

    fn attached(processes: usize) -> (Camera, Arc<PixelValueWorld>) {
        let world = Arc::new(PixelValueWorld::default());
        let camera = camera_with(Arc::clone(&world), Arc::new(PixelOriginGenerator::default()), processes, Arc::new(SumPipeline));
        (camera, world)
    }

    fn assert_close(a: &Bitmap, b: &Bitmap, tolerance: f32) {
        assert_eq!(a.dimensions(), b.dimensions());
        for (p, q) in a.pixels().iter().zip(b.pixels().iter()) {
            assert!((p - q).norm() <= tolerance * (1.0 + q.norm()), "{:?} vs {:?}", p, q);
        }
    }

    #[test]
    fn test_unattached_camera_fails_before_sampling() {
        let generator = Arc::new(PixelOriginGenerator::default());
        let mut camera = Camera::new(CameraConfig::default(), generator.clone())
            .with_sink(Box::new(NullSink));

        let err = camera.observe().unwrap_err();
        assert!(matches!(err, RenderError::Precondition(PreconditionError::NotAttached)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_inverted_wavelengths_fail_before_sampling() {
        let generator = Arc::new(PixelOriginGenerator::default());
        let mut camera = camera_with(Arc::new(PixelValueWorld::default()), generator.clone(), 1, Arc::new(SumPipeline));
        camera.config_mut().min_wavelength = 800.0;

        let err = camera.observe().unwrap_err();
        assert!(matches!(err, RenderError::Precondition(PreconditionError::WavelengthRange { .. })));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_serial_observation_matches_analytic_value() {
        let (mut camera, _world) = attached(1);
        camera.observe().unwrap();

        // Sum over all 7 bins of the radiance at each bin centre, times sensitivity.
        let delta = 300.0 / 7.0;
        for y in 0..3 {
            for x in 0..5 {
                let expected: f32 = (0..7)
                    .map(|i| PixelValueWorld::radiance(x, y, 0, 400.0 + delta * (i as f32 + 0.5)))
                    .sum::<f32>() * 1.5;
                let got = camera.frame().tristimulus()[(x, y)];
                assert!((got.x - expected).abs() < 1e-3 * expected, "pixel ({}, {})", x, y);
                assert_eq!(camera.frame().display()[(x, y)], got * 0.5);
            }
        }
        assert_eq!(camera.accumulated_samples(), 12);
    }

    #[test]
    fn test_serial_and_parallel_frames_identical() {
        let colors: Vec<Arc<dyn ColorPipeline>> = vec![Arc::new(SumPipeline), Arc::new(CieColorPipeline::new())];
        for color in colors.iter() {
            let world = Arc::new(PixelValueWorld::default());
            let mut serial = camera_with(Arc::clone(&world), Arc::new(PixelOriginGenerator::default()), 1, Arc::clone(color));
            let mut parallel = camera_with(Arc::clone(&world), Arc::new(PixelOriginGenerator::default()), 4, Arc::clone(color));

            serial.observe().unwrap();
            parallel.observe().unwrap();

            assert_eq!(serial.frame().tristimulus(), parallel.frame().tristimulus());
            assert_eq!(serial.frame().display(), parallel.frame().display());
            assert_eq!(serial.accumulated_samples(), parallel.accumulated_samples());
        }
    }

    #[test]
    fn test_accumulated_frame_is_mean_of_passes() {
        for processes in [1usize, 3].iter() {
            let (mut accumulating, world) = attached(*processes);
            accumulating.config_mut().accumulate = true;
            let (mut single, single_world) = attached(*processes);

            let passes = 4;
            let mut mean = Bitmap::new(5, 3);
            for pass in 0..passes {
                world.pass.store(pass, Ordering::SeqCst);
                single_world.pass.store(pass, Ordering::SeqCst);
                accumulating.observe().unwrap();
                single.observe().unwrap();

                for y in 0..3 {
                    for x in 0..5 {
                        mean[(x, y)] += single.frame().tristimulus()[(x, y)] / passes as f32;
                    }
                }
            }

            assert_close(accumulating.frame().tristimulus(), &mean, 1e-5);
            assert_eq!(accumulating.accumulated_samples(), 12 * passes);
            assert_eq!(single.accumulated_samples(), 12);
        }
    }

    #[test]
    fn test_disabling_accumulate_resets() {
        let (mut camera, world) = attached(1);
        camera.config_mut().accumulate = true;
        camera.observe().unwrap();
        world.pass.store(2, Ordering::SeqCst);
        camera.observe().unwrap();
        assert_eq!(camera.accumulated_samples(), 24);

        let (mut fresh, fresh_world) = attached(1);
        fresh_world.pass.store(2, Ordering::SeqCst);
        fresh.observe().unwrap();

        camera.config_mut().accumulate = false;
        camera.observe().unwrap();
        assert_eq!(camera.accumulated_samples(), 12);
        assert_eq!(camera.frame().tristimulus(), fresh.frame().tristimulus());
    }

    #[test]
    fn test_resizing_clears_frame() {
        let (mut camera, _world) = attached(1);
        camera.config_mut().accumulate = true;
        camera.observe().unwrap();
        assert!(!camera.frame().tristimulus().is_zero());

        camera.set_pixels((2, 2)).unwrap();
        assert_eq!(camera.accumulated_samples(), 0);
        assert_eq!(camera.frame().dimensions(), (2, 2));
        assert!(camera.frame().tristimulus().is_zero());
        assert!(camera.frame().display().is_zero());

        assert!(camera.set_pixels((0, 2)).is_err());
        assert_eq!(camera.frame().dimensions(), (2, 2));
    }

    #[test]
    fn test_resize_through_config_resets_immediately() {
        let (mut camera, _world) = attached(1);
        camera.config_mut().accumulate = true;
        camera.observe().unwrap();

        camera.config_mut().set_pixels((4, 1)).unwrap();
        assert_eq!(camera.frame().dimensions(), (4, 1));
        assert_eq!(camera.accumulated_samples(), 0);

        camera.observe().unwrap();
        assert_eq!(camera.accumulated_samples(), 12);
    }

    #[test]
    fn test_resize_and_back_still_resets() {
        let (mut camera, _world) = attached(1);
        camera.config_mut().accumulate = true;
        camera.observe().unwrap();
        assert_eq!(camera.accumulated_samples(), 12);

        camera.config_mut().set_pixels((4, 4)).unwrap();
        camera.config_mut().set_pixels((5, 3)).unwrap();
        assert_eq!(camera.accumulated_samples(), 0);
        assert_eq!(camera.frame().dimensions(), (5, 3));
        assert!(camera.frame().tristimulus().is_zero());

        // Reassigning the same size in one borrow also counts.
        camera.observe().unwrap();
        {
            let mut config = camera.config_mut();
            config.set_pixels((5, 3)).unwrap();
            config.accumulate = true;
        }
        assert_eq!(camera.accumulated_samples(), 0);
    }

    #[test]
    fn test_tracing_failure_leaves_frame_untouched() {
        for processes in [1usize, 3].iter() {
            let world = Arc::new(PixelValueWorld::default());
            let mut camera = camera_with(Arc::clone(&world), Arc::new(PixelOriginGenerator::default()), *processes, Arc::new(SumPipeline));
            camera.config_mut().accumulate = true;
            camera.observe().unwrap();
            let before = camera.frame().tristimulus().clone();

            let failing = Arc::new(PixelValueWorld::failing_at(3, 2));
            let failing_world: Arc<dyn World> = failing;
            camera.attach(Parent::World(failing_world));

            match camera.observe() {
                Err(RenderError::Tracing { x: 3, y: 2, source: TraceError::Tracer(_) }) => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
            assert_eq!(camera.frame().tristimulus(), &before);
            assert_eq!(camera.accumulated_samples(), 12);
        }
    }

    #[test]
    fn test_tracer_panic_leaves_frame_untouched() {
        for processes in [1usize, 3].iter() {
            let (mut camera, _world) = attached(*processes);
            camera.config_mut().accumulate = true;
            camera.observe().unwrap();
            let before = camera.frame().clone();

            let panicking: Arc<dyn World> = Arc::new(PixelValueWorld::panicking_at(1, 2));
            camera.attach(Parent::World(panicking));

            match camera.observe() {
                Err(RenderError::PixelPanicked { x: 1, y: 2, .. }) => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
            assert_eq!(camera.frame().tristimulus(), before.tristimulus());
            assert_eq!(camera.frame().display(), before.display());
            assert_eq!(camera.accumulated_samples(), 12);
        }
    }

    #[test]
    fn test_transitive_attachment_renders() {
        let world: Arc<dyn World> = Arc::new(PixelValueWorld::default());
        let mount = Arc::new(SceneNode::new(Some(Parent::World(world)), Transform::default()));

        let mut config = CameraConfig::new((2, 2), 1.0, 2, 1, 1, 1).unwrap();
        config.display_progress = false;
        let mut camera = Camera::new(config, Arc::new(PixelOriginGenerator::default()))
            .with_color_pipeline(Arc::new(SumPipeline))
            .with_sink(Box::new(NullSink));
        camera.attach(Parent::Node(mount));

        camera.observe().unwrap();
        assert!(!camera.frame().tristimulus().is_zero());
    }

    struct FrameCounter(Arc<std::sync::atomic::AtomicUsize>);

    impl RenderSink for FrameCounter {
        fn on_frame_update(&mut self, _frame: &Bitmap) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_display_and_save_use_display_buffer() {
        let updates = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let (camera, _world) = attached(1);
        let mut camera = camera.with_sink(Box::new(FrameCounter(Arc::clone(&updates))));
        camera.observe().unwrap();
        // display_progress is off, so only the explicit push reaches the sink
        camera.display();
        assert_eq!(updates.load(Ordering::SeqCst), 1);

        let path = std::env::temp_dir().join(format!("prisme-camera-{}.png", std::process::id()));
        camera.save(&path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
        assert!(camera.save("frame.unknown-format").is_err());
    }
}
