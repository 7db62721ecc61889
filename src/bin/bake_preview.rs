//! Headless visibility bake over a procedural landscape.
//!
//! Usage: cargo run --release --bin bake_preview -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>       Random seed for terrain, placement and order (default: 12345)
//!   --volumes <N>       Number of volumes scattered over the terrain (default: 8)
//!   --radius <R>        Volume radius (default: 25.0)
//!   --spacing <D>       Distance between points (default: 5.0)
//!   --pool <N>          Cubemaps baked per frame (default: 1)
//!   --preset <PATH>     Load volume configs from a preset JSON instead
//!   --max-frames <N>    Give up after N frames (default: 100000)

use std::path::PathBuf;
use std::time::Instant;

use glam::{UVec2, Vec3};
use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rktri_sightline::bake::{BakeConfig, VisibilitySystem};
use rktri_sightline::core::{Camera, CameraId, CameraProvider};
use rktri_sightline::render::{RecordingRenderer, RenderCall, RenderObject, RenderObjectKind};
use rktri_sightline::terrain::{HeightfieldLandscape, HeightfieldParams, LandscapeHandle};
use rktri_sightline::volume::{VisibilityVolume, VisibilityVolumeConfig, VolumePreset, WorldTransform};

struct PreviewCameras {
    camera: Camera,
    viewport: UVec2,
}

impl CameraProvider for PreviewCameras {
    fn observing_camera(&self) -> Option<&Camera> {
        Some(&self.camera)
    }

    fn viewport_size(&self) -> UVec2 {
        self.viewport
    }
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let volume_count = parse_usize_arg(&args, "--volumes").unwrap_or(8);
    let radius = parse_f32_arg(&args, "--radius").unwrap_or(25.0);
    let spacing = parse_f32_arg(&args, "--spacing").unwrap_or(5.0);
    let pool_size = parse_usize_arg(&args, "--pool").unwrap_or(1);
    let preset_path = parse_str_arg(&args, "--preset").map(PathBuf::from);
    let max_frames = parse_usize_arg(&args, "--max-frames").unwrap_or(100_000);

    println!("=== Rktri Sightline Bake Preview ===");
    println!("Seed:  {}", seed);
    println!("Pool:  {} cubemap(s) per frame", pool_size);

    let terrain_params = HeightfieldParams {
        seed,
        ..Default::default()
    };
    let half_extent = terrain_params.half_extent;

    let volumes: Vec<VisibilityVolumeConfig> = match &preset_path {
        Some(path) => {
            let preset = VolumePreset::load_sync(path).expect("Failed to load volume preset");
            println!("Preset: {} ({} volumes)", preset.name, preset.volumes.len());
            preset.volumes
        }
        None => {
            let config = VisibilityVolumeConfig {
                radius,
                distance_between_points: spacing,
                ..Default::default()
            };
            config.validate().expect("Invalid volume parameters");
            println!("Volumes: {} x r={} spacing={}", volume_count, radius, spacing);
            vec![config; volume_count]
        }
    };

    let mut world = World::new();
    let config = BakeConfig {
        pool_size,
        seed: Some(seed as u64),
        ..Default::default()
    };
    config.validate().expect("Invalid bake config");
    let mut system: VisibilitySystem<usize> = VisibilitySystem::from_config(config);

    let landscape = world.spawn((
        RenderObject::new(RenderObjectKind::Landscape),
        LandscapeHandle::new(HeightfieldLandscape::new(terrain_params)),
    ));
    system.register_entity(&world, landscape);

    let mut rng = StdRng::seed_from_u64(seed as u64);
    let scatter = half_extent * 0.8;
    for volume in volumes {
        let at = Vec3::new(
            rng.gen_range(-scatter..scatter),
            rng.gen_range(-scatter..scatter),
            0.0,
        );
        let entity = world.spawn((VisibilityVolume::new(volume), WorldTransform::from_translation(at)));
        system.register_entity(&world, entity);
    }

    let viewport = UVec2::new(1920, 1080);
    let mut camera = Camera::look_at(
        CameraId(1),
        Vec3::new(0.0, -half_extent, half_extent * 0.5),
        Vec3::ZERO,
        Vec3::Z,
    );
    camera.set_aspect(viewport.x as f32, viewport.y as f32);
    let cameras = PreviewCameras { camera, viewport };
    let mut renderer = RecordingRenderer::new();

    let start = Instant::now();
    let mut frames = 0;
    let mut last_report = 0.0;
    while frames < max_frames {
        system.process(&world, 1.0 / 60.0);
        if let Err(e) = system.draw(&world, &cameras, &mut renderer) {
            log::error!("Frame {} failed: {}", frames, e);
            break;
        }
        frames += 1;

        let progress = system.progress();
        if progress - last_report >= 0.1 {
            println!("  {:>5.1}% after {} frames", progress * 100.0, frames);
            last_report = progress;
        }
        if system.scheduler().is_complete() {
            break;
        }
    }

    let elapsed = start.elapsed();
    let captures = renderer.count(|c| matches!(c, RenderCall::RenderCubemap { .. }));
    let prerenders = renderer.count(|c| matches!(c, RenderCall::PrerenderScene));

    println!();
    println!("Control points: {}", system.control_points().len());
    println!("Frames:         {}", frames);
    println!("Captures:       {}", captures);
    println!("Prerenders:     {}", prerenders);
    println!("Complete:       {}", system.scheduler().is_complete());
    println!("Elapsed:        {:.2?}", elapsed);
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.clone())
}
