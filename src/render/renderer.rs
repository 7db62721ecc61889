//! Renderer interface driven by the visibility baker.

use crate::core::{Camera, Color, Result, UVec2, Vec3};
use crate::volume::ControlPoint;

/// GPU work the baker issues. Implemented by the engine's render backend.
///
/// All calls happen on the render thread inside [`VisibilitySystem::draw`]
/// or the freeze controls.
///
/// [`VisibilitySystem::draw`]: crate::bake::VisibilitySystem::draw
pub trait VisibilityRenderer {
    /// Cube render target type held by the render-target pool
    type Cubemap;

    /// Allocate a cube render target with faces of `size` pixels
    fn create_cubemap(&mut self, size: u32) -> Result<Self::Cubemap>;

    /// Resize the accumulation target to the viewport if needed
    fn create_or_update_render_target(&mut self, viewport: UVec2);

    /// Render scene depth from the final-gather camera
    fn prerender_scene(&mut self, camera: &Camera);

    /// Capture the scene into `target` from `point`
    fn render_to_cubemap_from_point(&mut self, point: Vec3, target: &Self::Cubemap);

    /// Reproject `cubemap` visibility into the overlay texture
    fn render_visibility_to_texture(
        &mut self,
        observer: &Camera,
        final_camera: &Camera,
        cubemap: &Self::Cubemap,
        point: &ControlPoint,
    );

    /// Composite the overlay (live or frozen) over the view of `camera`
    fn render_current_overlay_texture(&mut self, camera: &Camera);

    /// Draw the bake progress bar
    fn render_progress(&mut self, progress: f32, color: Color);

    /// Snapshot the current overlay
    fn fix_frame(&mut self);

    /// Drop the overlay snapshot
    fn release_frame(&mut self);

    fn frame_fixed(&self) -> bool;
}

/// A call issued to a [`RecordingRenderer`]
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    CreateCubemap { size: u32 },
    UpdateRenderTarget { viewport: UVec2 },
    PrerenderScene,
    RenderCubemap { point: Vec3, cubemap: usize },
    RenderVisibility { point: Vec3, cubemap: usize },
    RenderOverlay,
    RenderProgress { progress: f32, color: Color },
    FixFrame,
    ReleaseFrame,
}

/// Headless renderer that records every call.
///
/// Cubemaps are plain ids, so bakes can run without a GPU.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    next_cubemap: usize,
    frame_fixed: bool,
    fail_cubemap_creation: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following cubemap allocation fail
    pub fn set_fail_cubemap_creation(&mut self, fail: bool) {
        self.fail_cubemap_creation = fail;
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty
    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, predicate: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }
}

impl VisibilityRenderer for RecordingRenderer {
    type Cubemap = usize;

    fn create_cubemap(&mut self, size: u32) -> Result<usize> {
        if self.fail_cubemap_creation {
            return Err(crate::core::Error::RenderTarget(format!(
                "cannot allocate {size}x{size} cubemap"
            )));
        }
        let id = self.next_cubemap;
        self.next_cubemap += 1;
        self.calls.push(RenderCall::CreateCubemap { size });
        Ok(id)
    }

    fn create_or_update_render_target(&mut self, viewport: UVec2) {
        self.calls.push(RenderCall::UpdateRenderTarget { viewport });
    }

    fn prerender_scene(&mut self, _camera: &Camera) {
        self.calls.push(RenderCall::PrerenderScene);
    }

    fn render_to_cubemap_from_point(&mut self, point: Vec3, target: &usize) {
        self.calls.push(RenderCall::RenderCubemap { point, cubemap: *target });
    }

    fn render_visibility_to_texture(
        &mut self,
        _observer: &Camera,
        _final_camera: &Camera,
        cubemap: &usize,
        point: &ControlPoint,
    ) {
        self.calls.push(RenderCall::RenderVisibility { point: point.point, cubemap: *cubemap });
    }

    fn render_current_overlay_texture(&mut self, _camera: &Camera) {
        self.calls.push(RenderCall::RenderOverlay);
    }

    fn render_progress(&mut self, progress: f32, color: Color) {
        self.calls.push(RenderCall::RenderProgress { progress, color });
    }

    fn fix_frame(&mut self) {
        self.frame_fixed = true;
        self.calls.push(RenderCall::FixFrame);
    }

    fn release_frame(&mut self) {
        self.frame_fixed = false;
        self.calls.push(RenderCall::ReleaseFrame);
    }

    fn frame_fixed(&self) -> bool {
        self.frame_fixed
    }
}
