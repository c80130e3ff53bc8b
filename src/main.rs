// Copyright 2020 TwoCookingMice

use lumiere::core::error::Result;
use lumiere::core::resources::{HostResources, HostSurface};
use lumiere::core::scene_loader::{load_scene_with_settings, SceneDescription};
use lumiere::integrators::path::PathIntegrator;
use lumiere::io::{exr_utils, image_utils};
use lumiere::renderers::path_tracing::PathTracingRenderer;
use lumiere::renderers::renderer::{FrameView, Renderer};
use lumiere::renderers::sh_lighting::ShLightingRenderer;

use indicatif::{ProgressBar, ProgressStyle};
use std::env;

struct Overrides {
    frames: Option<u32>,
    seed: Option<u64>,
    max_bounces: Option<u32>,
    no_accumulation: bool,
    exr_path: Option<String>,
}

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.xml> <output.png> [--frames N] [--seed N] [--max-bounces N] [--no-accumulation] [--exr path]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut overrides = Overrides {
        frames: None,
        seed: None,
        max_bounces: None,
        no_accumulation: false,
        exr_path: None,
    };

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--frames" => {
                i += 1;
                overrides.frames = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--seed" => {
                i += 1;
                overrides.seed = args.get(i).and_then(|v| v.parse::<u64>().ok());
            }
            "--max-bounces" => {
                i += 1;
                overrides.max_bounces = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--no-accumulation" => {
                overrides.no_accumulation = true;
            }
            "--exr" => {
                i += 1;
                overrides.exr_path = args.get(i).cloned();
            }
            other => {
                log::warn!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    if let Err(e) = run(input_path, output_path, &overrides) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(input_path: &str, output_path: &str, overrides: &Overrides) -> Result<()> {
    let SceneDescription { mut scene, drawables: _drawables, camera, lights, mut settings, sh, width, height, frames } =
        load_scene_with_settings(input_path)?;

    if let Some(seed) = overrides.seed {
        settings.seed = seed;
    }
    if let Some(max_bounces) = overrides.max_bounces {
        settings.max_bounces = max_bounces;
    }
    if overrides.no_accumulation {
        settings.use_accumulation = false;
    }
    let frames = overrides.frames.unwrap_or(frames).max(1);

    let view = FrameView { camera: &camera, lights: &lights, settings };
    let mut gpu = HostResources::new();
    let mut surface = HostSurface::new();

    if lights.is_empty() {
        log::warn!("Scene has no lights, skipping SH precompute");
    } else {
        let mut sh_renderer = ShLightingRenderer::new(sh);
        sh_renderer.draw(&mut scene, &view, &mut gpu, &mut surface)?;
    }

    let mut renderer = PathTracingRenderer::new(width, height, PathIntegrator::new(settings.max_bounces));
    log::info!("Tracing {} frames at {}x{}", frames, width, height);
    let progress = ProgressBar::new(frames as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    for _ in 0..frames {
        renderer.draw(&mut scene, &view, &mut gpu, &mut surface)?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    image_utils::write_png_to_file(renderer.output(), output_path)?;
    log::info!("Wrote {}", output_path);
    if let Some(exr_path) = &overrides.exr_path {
        exr_utils::write_exr_to_file(&renderer.accumulated(), exr_path)?;
        log::info!("Wrote {}", exr_path);
    }
    Ok(())
}
