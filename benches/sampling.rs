use criterion::{criterion_group, criterion_main, Criterion, black_box};

use hecs::World;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rktri_sightline::bake::ProcessingOrder;
use rktri_sightline::terrain::{HeightfieldLandscape, HeightfieldParams, Landscape};
use rktri_sightline::volume::{
    generate_points, PointSampler, VisibilityVolume, VisibilityVolumeConfig, VolumeRegistry, WorldTransform,
};

use glam::Vec3;

fn bench_generate_points_small(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("generate_points_r10_s5", |b| {
        b.iter(|| generate_points(black_box(10.0), black_box(5.0), &mut rng));
    });
}

fn bench_generate_points_large(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);

    c.bench_function("generate_points_r100_s5", |b| {
        b.iter(|| generate_points(black_box(100.0), black_box(5.0), &mut rng));
    });
}

fn bench_generate_points_jittered(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let sampler = PointSampler::new(50.0, 4.0).with_vertical_variance(2.0);

    c.bench_function("generate_points_r50_s4_jitter", |b| {
        b.iter(|| sampler.generate(&mut rng));
    });
}

fn bench_processing_order(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(4);

    c.bench_function("processing_order_10k", |b| {
        b.iter(|| ProcessingOrder::rebuild(black_box(10_000), &mut rng));
    });
}

fn bench_control_points_on_heightfield(c: &mut Criterion) {
    let mut world = World::new();
    let mut registry = VolumeRegistry::new();
    let mut rng = StdRng::seed_from_u64(5);

    for i in 0..16 {
        let at = Vec3::new((i % 4) as f32 * 100.0 - 150.0, (i / 4) as f32 * 100.0 - 150.0, 0.0);
        let config = VisibilityVolumeConfig {
            radius: 40.0,
            distance_between_points: 5.0,
            ..Default::default()
        };
        let entity = world.spawn((VisibilityVolume::new(config), WorldTransform::from_translation(at)));
        let mut volume = world.get::<&mut VisibilityVolume>(entity).unwrap();
        registry.add(entity, &mut volume);
    }
    registry.refresh(&world, false, &mut rng);

    let landscape = HeightfieldLandscape::new(HeightfieldParams::default());
    let landscape: &dyn Landscape = &landscape;

    c.bench_function("control_points_16_volumes_heightfield", |b| {
        b.iter(|| registry.control_points(black_box(&world), Some(landscape), 0.1));
    });
}

criterion_group!(
    benches,
    bench_generate_points_small,
    bench_generate_points_large,
    bench_generate_points_jittered,
    bench_processing_order,
    bench_control_points_on_heightfield,
);
criterion_main!(benches);
