//! Registry of scene entities carrying visibility volumes.
//!
//! The registry owns the local sample offsets of every registered volume.
//! Offsets only change in [`VolumeRegistry::rebuild`]; world-space control
//! points are projected from them every frame.

use hecs::{Entity, World};

use crate::core::{Result, Vec3};
use crate::terrain::Landscape;
use super::component::{VisibilityVolume, WorldTransform};
use super::config::VisibilityVolumeConfig;
use super::control_point::{volume_color, ControlPoint};
use super::sampler::{PointSampler, RandomSource};

#[derive(Debug)]
struct VolumeEntry {
    entity: Entity,
    offsets: Vec<Vec3>,
}

/// What a [`VolumeRegistry::refresh`] pass changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// At least one volume got a new point set
    pub points_rebuilt: bool,
    /// At least one volume was invalid and is now valid again
    pub invalidated: bool,
}

/// Registered volumes in registration order
#[derive(Debug, Default)]
pub struct VolumeRegistry {
    entries: Vec<VolumeEntry>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a volume entity and invalidate it so points get generated.
    ///
    /// Returns false if the entity was already registered.
    pub fn add(&mut self, entity: Entity, volume: &mut VisibilityVolume) -> bool {
        volume.invalidate();
        if self.contains(entity) {
            return false;
        }
        self.entries.push(VolumeEntry {
            entity,
            offsets: Vec::new(),
        });
        true
    }

    /// Unregister a volume entity. Returns false if it was not registered.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.entity != entity);
        self.entries.len() != before
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.iter().any(|e| e.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Registered entities in registration order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entries.iter().map(|e| e.entity)
    }

    /// Local sample offsets of a registered volume
    pub fn offsets(&self, entity: Entity) -> Option<&[Vec3]> {
        self.entries
            .iter()
            .find(|e| e.entity == entity)
            .map(|e| e.offsets.as_slice())
    }

    /// Regenerate the point set of one volume.
    ///
    /// An invalid configuration leaves the volume without points.
    pub fn rebuild<R: RandomSource + ?Sized>(
        &mut self,
        entity: Entity,
        volume: &VisibilityVolume,
        rng: &mut R,
    ) -> Result<usize> {
        match self.entries.iter_mut().find(|e| e.entity == entity) {
            Some(entry) => rebuild_entry(entry, volume.config(), rng),
            None => Ok(0),
        }
    }

    /// Regenerate every registered volume, returning the total point count
    pub fn rebuild_all<R: RandomSource + ?Sized>(&mut self, world: &World, rng: &mut R) -> usize {
        let mut total = 0;
        for entry in &mut self.entries {
            let Ok(mut volume) = world.get::<&mut VisibilityVolume>(entry.entity) else {
                log::debug!("Skipping rebuild of {:?}: volume component missing", entry.entity);
                continue;
            };
            match rebuild_entry(entry, volume.config(), rng) {
                Ok(count) => total += count,
                Err(e) => log::warn!("Visibility volume {:?} has no points: {}", entry.entity, e),
            }
            volume.set_valid();
        }
        total
    }

    /// Revalidate volumes whose parameters changed since the last pass.
    ///
    /// With `force` every volume is treated as invalid and regenerated.
    pub fn refresh<R: RandomSource + ?Sized>(
        &mut self,
        world: &World,
        force: bool,
        rng: &mut R,
    ) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();

        for entry in &mut self.entries {
            let Ok(mut volume) = world.get::<&mut VisibilityVolume>(entry.entity) else {
                continue;
            };
            if volume.is_valid() && !force {
                continue;
            }

            if volume.should_rebuild_points() || force {
                if let Err(e) = rebuild_entry(entry, volume.config(), rng) {
                    log::warn!("Visibility volume {:?} has no points: {}", entry.entity, e);
                }
                outcome.points_rebuilt = true;
            }
            outcome.invalidated = true;
            volume.set_valid();
        }

        outcome
    }

    /// Number of control points produced by enabled volumes
    pub fn active_point_count(&self, world: &World) -> usize {
        self.entries
            .iter()
            .filter(|entry| {
                world
                    .get::<&VisibilityVolume>(entry.entity)
                    .map(|v| v.config().enabled)
                    .unwrap_or(false)
            })
            .map(|entry| entry.offsets.len())
            .sum()
    }

    /// Whether any enabled volume is registered
    pub fn has_enabled_volume(&self, world: &World) -> bool {
        self.entries.iter().any(|entry| {
            world
                .get::<&VisibilityVolume>(entry.entity)
                .map(|v| v.config().enabled)
                .unwrap_or(false)
        })
    }

    /// Project every enabled volume's offsets into world space.
    ///
    /// Points are produced in registration order, then offset order.
    pub fn control_points(
        &self,
        world: &World,
        landscape: Option<&dyn Landscape>,
        near_clip_plane: f32,
    ) -> Vec<ControlPoint> {
        let mut points = Vec::with_capacity(self.active_point_count(world));

        for entry in &self.entries {
            let Ok(volume) = world.get::<&VisibilityVolume>(entry.entity) else {
                continue;
            };
            let config = volume.config();
            if !config.enabled {
                continue;
            }

            let transform = world
                .get::<&WorldTransform>(entry.entity)
                .map(|t| *t)
                .unwrap_or_default();
            let position = transform.translation();
            let volume_normal = transform.transform_vector(Vec3::Z).normalize_or_zero();
            let color = volume_color(config, entry.offsets.len());

            for offset in &entry.offsets {
                let local = position + transform.transform_vector(*offset);
                let (point, normal) =
                    snap_to_landscape(local, volume_normal, config, landscape, near_clip_plane);
                points.push(ControlPoint::new(point, normal, color, config));
            }
        }

        points
    }
}

fn rebuild_entry<R: RandomSource + ?Sized>(
    entry: &mut VolumeEntry,
    config: &VisibilityVolumeConfig,
    rng: &mut R,
) -> Result<usize> {
    entry.offsets.clear();
    config.validate()?;

    entry.offsets = PointSampler::from_config(config).generate(rng);
    log::debug!(
        "Rebuilt visibility volume {:?}: {} points (r={}, spacing={})",
        entry.entity,
        entry.offsets.len(),
        config.radius,
        config.distance_between_points
    );
    Ok(entry.offsets.len())
}

/// Apply landscape placement to a world-space sample point.
///
/// Points are kept at least two near-plane distances above the surface so
/// the cubemap capture does not clip into the ground.
pub fn snap_to_landscape(
    point: Vec3,
    normal: Vec3,
    config: &VisibilityVolumeConfig,
    landscape: Option<&dyn Landscape>,
    near_clip_plane: f32,
) -> (Vec3, Vec3) {
    let Some(surface) = landscape.and_then(|l| l.place_point(point)) else {
        return (point, normal);
    };

    let mut point = point;
    let mut normal = normal;
    if config.place_on_landscape {
        normal = surface.normal;
        point.z = surface.position.z + config.height_above_landscape;
    }
    point.z = point.z.max(surface.position.z + 2.0 * near_clip_plane);
    (point, normal)
}
