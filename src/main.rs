//! `photon-render` — the CLI driver. Loads a scene, builds the BVH, renders
//! with the selected back-end, writes a PNG. Not the core engine (that's the
//! library); this binary is the thinnest possible wiring around it.

use clap::Parser;
use photon_core::{camera::Camera, demo_scenes, gpu, render, scene_io};
use std::path::PathBuf;
use std::process::ExitCode;

/// Offline path tracer: SAH BVH over triangles, brute-force spheres, CPU or
/// GPU-parity back-end. Back-end selection is `-cpu`/`-gpu` (single dash, not
/// clap long flags — scanned out of `argv` before the rest is parsed, the
/// same way the original C++ driver does it).
#[derive(Parser, Debug)]
#[command(
    name = "photon-render",
    version,
    about = "Offline Monte Carlo path tracer with CPU and GPU-parity back-ends",
    after_help = "EXAMPLES:\n  \
                  photon-render -cpu -o out.png\n  \
                  photon-render -gpu --scene scenes/cornell.json -o cornell.png"
)]
struct Cli {
    /// Scene description JSON (spec §6 exchange format). Defaults to a built-in showcase scene.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Output PNG path.
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,
}

/// Pulls `-cpu`/`-gpu` out of the raw args, since clap's `long` flags always
/// require a double dash and can't express the single-dash form spec.md
/// mandates. Everything else is left for `Cli::parse_from`.
fn scan_backend_flag(args: &[String]) -> (bool, bool, Vec<String>) {
    let mut use_cpu = false;
    let mut use_gpu = false;
    let mut rest = Vec::with_capacity(args.len());
    for arg in args {
        match arg.as_str() {
            "-cpu" => use_cpu = true,
            "-gpu" => use_gpu = true,
            other => rest.push(other.to_string()),
        }
    }
    (use_cpu, use_gpu, rest)
}

fn main() -> ExitCode {
    env_logger::init();
    let raw_args: Vec<String> = std::env::args().collect();
    let (use_cpu, use_gpu, rest) = scan_backend_flag(&raw_args);
    let cli = Cli::parse_from(rest);

    if use_cpu && use_gpu {
        eprintln!("error: cannot enable both -cpu and -gpu, select only one");
        return ExitCode::FAILURE;
    } else if !use_cpu && !use_gpu {
        eprintln!("error: exactly one of -cpu or -gpu is required");
        return ExitCode::FAILURE;
    }

    let (scene, camera_config) = match cli.scene {
        Some(path) => match scene_io::load_scene_file(&path) {
            Ok(loaded) => (loaded.scene, loaded.camera_config),
            Err(err) => {
                eprintln!("error: failed to load scene {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => demo_scenes::showcase(),
    };

    let camera = Camera::new(&camera_config);

    log::info!(
        "back-end={} image={}x{} spp={}",
        if use_cpu { "cpu" } else { "gpu" },
        camera.image_width,
        camera.image_height,
        camera.samples_per_pixel
    );

    let t0 = std::time::Instant::now();
    let framebuffer = if use_cpu {
        render::render(&scene, &camera)
    } else {
        gpu::render_reference(&scene, &camera)
    };
    let elapsed = t0.elapsed();

    let total_rays = camera.image_width as u64
        * camera.image_height as u64
        * camera.samples_per_pixel as u64;
    log::info!(
        "rendered in {:.2}s ({:.2} Mrays/s)",
        elapsed.as_secs_f64(),
        total_rays as f64 / elapsed.as_secs_f64() / 1e6
    );

    match image::save_buffer(
        &cli.output,
        &framebuffer.pixels,
        framebuffer.width,
        framebuffer.height,
        image::ColorType::Rgb8,
    ) {
        Ok(()) => {
            log::info!("wrote {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to write {}: {err}", cli.output.display());
            ExitCode::FAILURE
        }
    }
}
