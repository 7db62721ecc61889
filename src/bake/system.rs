//! Scene system that bakes terrain visibility a few points per frame.
//!
//! `process` keeps the control points in sync with the registered volumes,
//! `draw` issues the GPU work for the current frame. Progress survives across
//! frames until the volumes or the observing camera change.

use std::collections::HashSet;
use std::sync::Arc;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::{CameraProvider, Result};
use crate::render::{RenderObject, RenderObjectKind, VisibilityRenderer};
use crate::terrain::{Landscape, LandscapeHandle};
use crate::volume::{ControlPoint, RandomSource, VisibilityVolume, VolumeRegistry};
use super::cache::{CacheValidator, CameraState};
use super::config::BakeConfig;
use super::order::ProcessingOrder;
use super::pool::RenderTargetPool;
use super::scheduler::{BakeScheduler, BakeState, FreezeAction};

/// Random source owned by the system
pub type BoxedRandom = Box<dyn RandomSource + Send>;

/// Amortized terrain visibility baker.
///
/// `C` is the renderer's cubemap type held in the render-target pool.
pub struct VisibilitySystem<C> {
    config: BakeConfig,
    registry: VolumeRegistry,
    scheduler: BakeScheduler,
    cache: CacheValidator,
    pool: RenderTargetPool<C>,
    control_points: Vec<ControlPoint>,
    landscape: Option<(Entity, Arc<dyn Landscape>)>,
    render_entities: HashSet<Entity>,
    force_rebuild_points: bool,
    rng: BoxedRandom,
}

impl<C> VisibilitySystem<C> {
    /// Create a system baking with the given render-target pool.
    ///
    /// The pool capacity sets how many points are baked per frame.
    pub fn new(config: BakeConfig, pool: RenderTargetPool<C>) -> Self {
        let rng: BoxedRandom = match config.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        Self::with_rng(config, pool, rng)
    }

    /// Create a system with a pool sized from `config`
    pub fn from_config(config: BakeConfig) -> Self {
        let pool = RenderTargetPool::new(config.pool_size, config.cubemap_size);
        Self::new(config, pool)
    }

    /// Create a system drawing randomness from `rng`
    pub fn with_rng(config: BakeConfig, pool: RenderTargetPool<C>, rng: BoxedRandom) -> Self {
        if config.pool_size != pool.capacity() {
            log::warn!(
                "Bake config asks for {} render targets, pool has {}",
                config.pool_size,
                pool.capacity()
            );
        }
        log::info!(
            "Visibility system: {} cubemap(s) of {}px",
            pool.capacity(),
            pool.target_size()
        );

        Self {
            scheduler: BakeScheduler::new(pool.capacity()),
            config,
            registry: VolumeRegistry::new(),
            cache: CacheValidator::new(),
            pool,
            control_points: Vec::new(),
            landscape: None,
            render_entities: HashSet::new(),
            force_rebuild_points: false,
            rng,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    pub fn registry(&self) -> &VolumeRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &BakeScheduler {
        &self.scheduler
    }

    pub fn pool(&self) -> &RenderTargetPool<C> {
        &self.pool
    }

    /// World-space control points of the current frame
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    /// Entity providing the snapping surface
    pub fn landscape_entity(&self) -> Option<Entity> {
        self.landscape.as_ref().map(|(entity, _)| *entity)
    }

    pub fn is_registered(&self, entity: Entity) -> bool {
        self.registry.contains(entity) || self.render_entities.contains(&entity)
    }

    pub fn volume_count(&self) -> usize {
        self.registry.len()
    }

    /// Fraction of the current bake that is done
    pub fn progress(&self) -> f32 {
        self.scheduler.progress()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Toggle the whole system. Re-enabling restarts the bake.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled == enabled {
            return;
        }
        self.config.enabled = enabled;
        if enabled {
            self.cache.clear();
            self.scheduler.invalidate();
        }
        log::info!("Visibility system {}", if enabled { "enabled" } else { "disabled" });
    }

    // --- Entity registration ---

    /// Register an entity, resolving its visibility capabilities once.
    ///
    /// Returns true if the entity carries anything the system uses.
    pub fn register_entity(&mut self, world: &World, entity: Entity) -> bool {
        let mut used = false;

        if let Ok(mut volume) = world.get::<&mut VisibilityVolume>(entity) {
            if self.registry.add(entity, &mut volume) {
                log::debug!("Registered visibility volume {:?}", entity);
            }
            used = true;
        }

        if let Ok(object) = world.get::<&RenderObject>(entity) {
            self.render_entities.insert(entity);
            used = true;

            if object.kind == RenderObjectKind::Landscape {
                if let Ok(handle) = world.get::<&LandscapeHandle>(entity) {
                    log::debug!("Using landscape {:?} for point placement", entity);
                    self.landscape = Some((entity, Arc::clone(&handle.0)));
                }
            }
        }

        used
    }

    /// Forget an entity. Removing a volume restarts the bake.
    pub fn unregister_entity(&mut self, entity: Entity) {
        if self.registry.remove(entity) {
            log::debug!("Unregistered visibility volume {:?}", entity);
            self.scheduler.invalidate();
        }
        self.render_entities.remove(&entity);
        if self.landscape_entity() == Some(entity) {
            log::debug!("Landscape {:?} removed, point placement disabled", entity);
            self.landscape = None;
        }
    }

    /// Drop every registration before the scene goes away
    pub fn prepare_for_remove(&mut self) {
        self.registry.clear();
        self.render_entities.clear();
        self.landscape = None;
        self.control_points.clear();
        self.cache.clear();
        self.scheduler.reset();
    }

    /// Free pooled cubemaps; they are recreated on the next draw
    pub fn release_render_targets(&mut self) {
        self.pool.release_all();
    }

    /// Regenerate every volume's points on the next update
    pub fn rebuild_all_points(&mut self) {
        self.force_rebuild_points = true;
    }

    /// Whether `entity` takes part in visibility captures
    pub fn should_draw_render_object(&self, world: &World, entity: Entity) -> bool {
        crate::render::should_draw_render_object(world, &self.render_entities, entity)
    }

    // --- Frame ---

    /// Revalidate volumes and refresh the world-space control points
    pub fn process(&mut self, world: &World, _dt: f32) {
        if !self.config.enabled {
            return;
        }

        let outcome = self.registry.refresh(world, self.force_rebuild_points, self.rng.as_mut());
        self.force_rebuild_points = false;
        if outcome.invalidated {
            self.scheduler.invalidate();
        }

        let landscape = self.landscape.as_ref().map(|(_, l)| &**l);
        self.control_points = self
            .registry
            .control_points(world, landscape, self.config.near_clip_plane);

        if outcome.points_rebuilt || self.control_points.len() != self.scheduler.total() {
            log::debug!(
                "Control points {} -> {}, reshuffling",
                self.scheduler.total(),
                self.control_points.len()
            );
            let order = ProcessingOrder::rebuild(self.control_points.len(), self.rng.as_mut());
            self.scheduler.set_order(order);
        }
    }

    /// Issue this frame's visibility work.
    ///
    /// Fails only when a cubemap cannot be created; the point is retried on
    /// the next frame.
    pub fn draw<P, R>(&mut self, world: &World, cameras: &P, renderer: &mut R) -> Result<()>
    where
        P: CameraProvider + ?Sized,
        R: VisibilityRenderer<Cubemap = C>,
    {
        if !self.config.enabled {
            return Ok(());
        }
        let (Some(state), Some(observer)) = (CameraState::capture(cameras), cameras.observing_camera()) else {
            log::trace!("No observing camera, skipping visibility frame");
            return Ok(());
        };
        let final_camera = cameras.current_camera().unwrap_or(observer);

        if !self.cache.is_valid(&state) {
            self.cache.rebuild(state);
            self.scheduler.invalidate();
        }

        if self.scheduler.needs_prerender() {
            log::debug!("Prerendering scene for {} control points", self.control_points.len());
            renderer.create_or_update_render_target(state.viewport_size);
            renderer.prerender_scene(final_camera);
            let action = self.scheduler.on_prerendered();
            apply_freeze_action(action, renderer);
        }

        assert_eq!(
            self.scheduler.total(),
            self.control_points.len(),
            "processing order does not match control points"
        );

        for assignment in self.scheduler.plan_frame() {
            let point = &self.control_points[assignment.point];
            let cubemap = self
                .pool
                .get_or_create(assignment.slot, |size| renderer.create_cubemap(size))?;

            renderer.render_to_cubemap_from_point(point.point, cubemap);
            renderer.render_visibility_to_texture(observer, final_camera, cubemap, point);

            let action = self.scheduler.advance();
            apply_freeze_action(action, renderer);
        }

        if self.registry.has_enabled_volume(world) {
            if self.scheduler.is_complete() || self.scheduler.freeze_state().is_frozen() {
                renderer.render_current_overlay_texture(final_camera);
            }
            if self.scheduler.state() == BakeState::Sampling {
                let color = self
                    .config
                    .progress_bar_color(self.scheduler.freeze_state().is_pending());
                renderer.render_progress(self.scheduler.progress(), color);
            }
        }

        Ok(())
    }

    // --- Controls ---

    /// Restart the bake from the first point without clearing the overlay
    pub fn recalculate(&mut self) {
        log::info!("Recalculating visibility");
        self.scheduler.recalculate();
    }

    /// Freeze the overlay now, or as soon as the running bake completes
    pub fn fix_current_frame<R: VisibilityRenderer>(&mut self, renderer: &mut R) {
        let action = self.scheduler.fix_current_frame();
        if action == FreezeAction::None {
            log::info!("Visibility frame will be fixed when the bake completes");
        }
        apply_freeze_action(action, renderer);
    }

    /// Unfreeze the overlay and cancel a pending freeze
    pub fn release_fixed_frame<R: VisibilityRenderer>(&mut self, renderer: &mut R) {
        let action = self.scheduler.release_fixed_frame();
        apply_freeze_action(action, renderer);
    }
}

fn apply_freeze_action<R: VisibilityRenderer + ?Sized>(action: FreezeAction, renderer: &mut R) {
    match action {
        FreezeAction::None => {}
        FreezeAction::Freeze => {
            log::info!("Fixing visibility frame");
            renderer.fix_frame();
        }
        FreezeAction::Release => {
            log::info!("Releasing fixed visibility frame");
            renderer.release_frame();
        }
    }
}
