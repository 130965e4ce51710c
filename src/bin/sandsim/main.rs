// sandsim - Run a particle scene headless and snapshot the last frame
//
// Pipeline:
//   1. Build the scene from defaults or a JSON config
//   2. Place a synthetic input box in the middle of the viewport
//   3. Arm, start and step the frame loop by hand
//   4. Log a summary and rasterize the final frame to PNG
//
// Usage: cargo run --bin sandsim -- [--scene sand|drift|grid|triangles]
//        [--width W] [--height H] [--steps N] [--config file.json] [--out frame.png]

mod raster;

use std::env;
use std::error::Error;
use std::fs;

use serde::de::DeserializeOwned;
use sand_engine::config::{from_json, Validate};
use sand_engine::render::Shape;
use sand_engine::{
    Bounds, DriftConfig, DriftWorld, EngineError, Encoder, FrameLoop, GridConfig, GridWorld, ManualScheduler,
    SandConfig, SandWorld, Scene, StaticGeometry, TriangleConfig, TriangleField,
};

struct Args {
    scene: String,
    width: f32,
    height: f32,
    steps: u32,
    config: Option<String>,
    out: Option<String>,
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args {
        scene: "sand".to_string(),
        width: 800.0,
        height: 600.0,
        steps: 500,
        config: None,
        out: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--scene" => { parsed.scene = value.cloned().unwrap_or(parsed.scene); i += 2; }
            "--width" => { parsed.width = value.and_then(|s| s.parse().ok()).unwrap_or(800.0); i += 2; }
            "--height" => { parsed.height = value.and_then(|s| s.parse().ok()).unwrap_or(600.0); i += 2; }
            "--steps" => { parsed.steps = value.and_then(|s| s.parse().ok()).unwrap_or(500); i += 2; }
            "--config" => { parsed.config = value.cloned(); i += 2; }
            "--out" => { parsed.out = value.cloned(); i += 2; }
            other => {
                log::warn!("ignoring argument '{}'", other);
                i += 1;
            }
        }
    }
    parsed
}

fn load<T: Default + DeserializeOwned + Validate>(json: Option<&str>) -> Result<T, EngineError> {
    match json {
        Some(j) => from_json(j),
        None => Ok(T::default()),
    }
}

/// Input box the size of the site's prompt field, centered.
fn input_box(width: f32, height: f32) -> Bounds {
    let w = (width * 0.5).min(480.0);
    let h = 40.0_f32.min(height * 0.1);
    Bounds::new((width - w) * 0.5, height * 0.4, w, h)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args);
    let json = args.config.as_deref().map(fs::read_to_string).transpose()?;
    let json = json.as_deref();

    let scene: Box<dyn Scene> = match args.scene.as_str() {
        "sand" => Box::new(SandWorld::new(load::<SandConfig>(json)?)),
        "drift" => Box::new(DriftWorld::new(load::<DriftConfig>(json)?)),
        "grid" => Box::new(GridWorld::new(load::<GridConfig>(json)?)),
        "triangles" => Box::new(TriangleField::new(load::<TriangleConfig>(json)?)),
        other => return Err(format!("unknown scene '{}'", other).into()),
    };

    let input = input_box(args.width, args.height);
    let geometry = StaticGeometry { input: Some(input), glyphs: Vec::new() };
    let mut frame_loop = FrameLoop::new(ManualScheduler::new(), Box::new(geometry), args.width, args.height);
    frame_loop.arm(scene);
    frame_loop.start();

    log::info!(
        "running {} at {}x{} for {} steps",
        args.scene, args.width, args.height, args.steps
    );

    let mut frame = Encoder::new();
    for _ in 0..args.steps {
        frame_loop.frame(&mut frame);
    }

    // Summary
    let circles: Vec<(f32, f32)> = frame
        .shapes()
        .iter()
        .filter_map(|s| match *s {
            Shape::Circle { x, y, .. } => Some((x, y)),
            Shape::Chevron { .. } => None,
        })
        .collect();
    let below = circles.iter().filter(|&&(_, y)| y >= input.bottom()).count();
    let count = frame_loop.scene().map_or(0, |s| s.len());
    log::info!("{} elements after {} frames", count, frame_loop.frames());
    if !circles.is_empty() {
        log::info!(
            "{:.1}% of particles below the input",
            below as f32 / circles.len() as f32 * 100.0
        );
    }

    if let Some(out) = &args.out {
        raster::rasterize(&frame).save(out)?;
        log::info!("wrote {}", out);
    }

    frame_loop.teardown();
    Ok(())
}
