// Copyright @yucwang 2021

use crate::core::color::ColorMatchingTable;
use crate::core::error::RenderError;
use crate::core::frame::FrameAccumulator;
use crate::core::progress::RenderSink;
use crate::core::ray_template::RayTemplate;
use crate::core::rng::worker_rng;

use super::renderer::{panic_message, sample_pixel, PixelResult, RenderJob, RenderMonitor, Renderer};

use crossbeam_channel::{Receiver, Sender};
use std::any::Any;
use std::thread;

/// Message on the task channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Pixel { x: usize, y: usize },
    Shutdown,
}

type WorkerMessage = Result<PixelResult, RenderError>;

/// Bookkeeping for one channel's worker pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSummary {
    pub results: usize,
    pub shutdowns_sent: usize,
    pub workers_joined: usize,
    pub tasks_processed: usize,
}

/// Producer/worker pool render loop.
///
/// Per channel a producer thread queues every pixel, `workers` threads race
/// for tasks and the calling thread folds results into the frame in arrival
/// order. A fresh pool is spawned for each channel.
#[derive(Debug, Clone, Copy)]
pub struct ParallelRenderer {
    workers: usize,
}

impl ParallelRenderer {
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }

    pub fn render_channel(&self,
                          job: &RenderJob,
                          channel: usize,
                          template: &RayTemplate,
                          table: &ColorMatchingTable,
                          frame: &mut FrameAccumulator,
                          monitor: &mut RenderMonitor) -> Result<ChannelSummary, RenderError> {
        let (width, height) = (job.settings.width, job.settings.height);
        let total_pixels = job.settings.total_pixels();
        let seed = job.settings.seed.map(|s| s.wrapping_add(channel as u64));

        let (task_tx, task_rx) = crossbeam_channel::unbounded::<Task>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<WorkerMessage>();
        let mut summary = ChannelSummary::default();

        log::debug!("channel {}: spawning {} workers for {} pixels", channel, self.workers, total_pixels);

        thread::scope(|scope| {
            let producer = {
                let task_tx = task_tx.clone();
                scope.spawn(move || produce(width, height, &task_tx))
            };

            let workers: Vec<_> = (0..self.workers)
                .map(|worker| {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        run_worker(job, template, table, seed, worker, &task_rx, &result_tx)
                    })
                })
                .collect();
            drop(result_tx);

            let mut outcome = Ok(());
            for pixel in 0..total_pixels {
                match result_rx.recv() {
                    Ok(Ok(result)) => {
                        frame.add(result.x, result.y, &result.tristimulus, job.color);
                        monitor.pixel_done(channel, pixel, result.ray_count, frame.display());
                        summary.results += 1;
                    }
                    Ok(Err(err)) => {
                        outcome = Err(err);
                        break;
                    }
                    Err(_) => {
                        outcome = Err(RenderError::WorkerDisconnected { missing: total_pixels - pixel });
                        break;
                    }
                }
            }

            let producer_result = producer.join();
            if outcome.is_err() {
                // Abandon pixels nobody has picked up yet.
                let dropped = task_rx.try_iter().filter(|t| *t != Task::Shutdown).count();
                log::warn!("channel {}: aborting, {} queued pixels dropped", channel, dropped);
            }

            for _ in 0..self.workers {
                if task_tx.send(Task::Shutdown).is_ok() {
                    summary.shutdowns_sent += 1;
                }
            }

            for handle in workers {
                match handle.join() {
                    Ok(processed) => {
                        summary.workers_joined += 1;
                        summary.tasks_processed += processed;
                    }
                    Err(payload) => {
                        if outcome.is_ok() {
                            outcome = Err(pool_panicked("render worker", payload.as_ref()));
                        }
                    }
                }
            }

            if outcome.is_ok() {
                if let Err(payload) = producer_result {
                    outcome = Err(pool_panicked("task producer", payload.as_ref()));
                }
            }
            outcome
        })?;

        log::debug!("channel {}: {:?}", channel, summary);
        Ok(summary)
    }
}

impl Renderer for ParallelRenderer {
    fn render(&self, job: &RenderJob, frame: &mut FrameAccumulator, sink: &mut dyn RenderSink) -> Result<(), RenderError> {
        let mut monitor = RenderMonitor::start(job.settings, job.templates.len(), frame.display(), sink);

        for (channel, template) in job.templates.iter().enumerate() {
            let table = job.color.resample(template.min_wavelength, template.max_wavelength, template.num_samples);
            self.render_channel(job, channel, template, &table, frame, &mut monitor)?;
        }

        monitor.finish(frame.display());
        Ok(())
    }
}

fn produce(width: usize, height: usize, task_tx: &Sender<Task>) {
    for y in 0..height {
        for x in 0..width {
            if task_tx.send(Task::Pixel { x, y }).is_err() {
                return;
            }
        }
    }
}

/// Worker loop. Returns the number of pixel tasks handled.
fn run_worker(job: &RenderJob,
              template: &RayTemplate,
              table: &ColorMatchingTable,
              seed: Option<u64>,
              worker: usize,
              task_rx: &Receiver<Task>,
              result_tx: &Sender<WorkerMessage>) -> usize {
    // Each worker owns its generator so no two share a sample stream.
    let mut rng = worker_rng(seed, worker);
    let mut processed = 0;

    while let Ok(task) = task_rx.recv() {
        let (x, y) = match task {
            Task::Pixel { x, y } => (x, y),
            Task::Shutdown => break,
        };

        let message = sample_pixel(job, x, y, template, table, &mut rng);
        processed += 1;
        if result_tx.send(message).is_err() {
            break;
        }
    }

    processed
}

/// A pool thread died outside any pixel; no coordinates apply.
fn pool_panicked(thread: &str, payload: &(dyn Any + Send)) -> RenderError {
    RenderError::PoolPanicked { message: format!("{} panicked: {}", thread, panic_message(payload)) }
}
