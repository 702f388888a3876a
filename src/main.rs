// Copyright 2020 TwoCookingMice

use prisme::core::progress::RenderSink;
use prisme::io::sinks::{MultiSink, PreviewSink, ProgressBarSink};
use prisme::math::constants::Float;
use prisme::sensors::pinhole::PinholeRayGenerator;
use prisme::worlds::sky::SkyWorld;
use prisme::{Camera, CameraConfig, Parent, World};

use std::env;
use std::error::Error;
use std::sync::Arc;

struct Options {
    output: String,
    width: usize,
    height: usize,
    pixel_samples: usize,
    spectral_samples: usize,
    spectral_rays: usize,
    threads: usize,
    passes: usize,
    fov: Float,
    seed: Option<u64>,
    preview: Option<String>,
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    args.get(i)
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| format!("invalid or missing value for {}", flag))
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        output: args[1].clone(),
        width: 256,
        height: 256,
        pixel_samples: 16,
        spectral_samples: 21,
        spectral_rays: 1,
        threads: 0,
        passes: 1,
        fov: 45.0,
        seed: None,
        preview: None,
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        match flag {
            "--width" => options.width = parse_value(args, i, flag)?,
            "--height" => options.height = parse_value(args, i, flag)?,
            "--spp" => options.pixel_samples = parse_value(args, i, flag)?,
            "--samples" => options.spectral_samples = parse_value(args, i, flag)?,
            "--rays" => options.spectral_rays = parse_value(args, i, flag)?,
            "--threads" => options.threads = parse_value(args, i, flag)?,
            "--passes" => options.passes = parse_value(args, i, flag)?,
            "--fov" => options.fov = parse_value(args, i, flag)?,
            "--seed" => options.seed = Some(parse_value(args, i, flag)?),
            "--preview" => options.preview = Some(parse_value(args, i, flag)?),
            _ => {
                log::warn!("Ignoring unknown argument {}.", flag);
                continue;
            }
        }
        i += 1;
    }

    Ok(options)
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let mut config = CameraConfig::new((options.width, options.height),
                                       1.0,
                                       options.spectral_samples,
                                       options.spectral_rays,
                                       options.pixel_samples,
                                       options.threads)?;
    config.accumulate = true;
    config.seed = options.seed;
    config.display_progress = options.preview.is_some();

    let mut sinks: Vec<Box<dyn RenderSink>> = vec![Box::new(ProgressBarSink::new())];
    if let Some(path) = &options.preview {
        sinks.push(Box::new(PreviewSink::new(path)));
    }

    let world: Arc<dyn World> = Arc::new(SkyWorld::default());
    let mut camera = Camera::new(config, Arc::new(PinholeRayGenerator::new(options.fov)))
        .with_sink(Box::new(MultiSink::new(sinks)));
    camera.attach(Parent::World(world));

    for pass in 0..options.passes {
        log::info!("Pass {}/{}", pass + 1, options.passes);
        camera.observe()?;
    }

    log::info!("{} samples per pixel accumulated.", camera.accumulated_samples());
    camera.save(&options.output)?;
    log::info!("Wrote {}", options.output);
    Ok(())
}

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <output.(png|exr)> [--width N] [--height N] [--spp N] [--samples N] [--rays N] \
                   [--threads N] [--passes N] [--fov DEG] [--seed N] [--preview PATH]", args[0]);
        std::process::exit(1);
    }

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Render failed: {}", e);
        std::process::exit(2);
    }
}
