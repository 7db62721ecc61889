//! Frame-budgeted bake state machine.
//!
//! The scheduler walks the processing order a few points per frame. It owns
//! no GPU resources; [`VisibilitySystem`](super::VisibilitySystem) turns its
//! plans and freeze actions into renderer calls.
//!
//! ```text
//!            Invalidated                Prerendered              Advanced (cursor == total)
//!   Idle ───────────────► NeedsPrerender ──────────► Sampling ─────────────────────────► Complete
//!                               ▲         (0 points) ───────────────────────────────────────┘
//!                               └──────────────── Invalidated (from any state) ─────────────┘
//! ```

use super::order::ProcessingOrder;

/// Progress of the current bake
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BakeState {
    /// Nothing scheduled yet
    #[default]
    Idle,
    /// Results are stale; the scene must be prerendered before sampling
    NeedsPrerender,
    /// Points are being baked
    Sampling,
    /// Every point has been baked for the current camera
    Complete,
}

/// Inputs of the bake state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakeEvent {
    /// Volumes, point count or camera changed, or a recalculation was requested
    Invalidated,
    /// The global scene prerender was issued
    Prerendered,
    /// One point was baked
    Advanced,
}

impl BakeState {
    /// Transition table. Events that do not apply leave the state unchanged.
    pub fn next(self, event: BakeEvent, cursor: usize, total: usize) -> BakeState {
        use BakeEvent::*;
        use BakeState::*;

        match (self, event) {
            (_, Invalidated) => NeedsPrerender,
            (NeedsPrerender, Prerendered) if total == 0 => Complete,
            (NeedsPrerender, Prerendered) => Sampling,
            (Sampling, Advanced) if cursor >= total => Complete,
            (state, _) => state,
        }
    }
}

/// Overlay freeze state, orthogonal to [`BakeState`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreezeState {
    /// Overlay follows the bake
    #[default]
    Live,
    /// Freeze as soon as the bake completes
    Pending,
    /// A snapshot is shown
    Frozen,
    /// A snapshot is shown and will be replaced when the running bake completes
    FrozenPending,
}

/// Inputs of the freeze state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreezeEvent {
    FixRequested { complete: bool },
    Released,
    Recalculated,
    BakeCompleted,
}

/// Renderer work requested by a freeze transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreezeAction {
    #[default]
    None,
    Freeze,
    Release,
}

impl FreezeState {
    /// Transition table
    pub fn next(self, event: FreezeEvent) -> (FreezeState, FreezeAction) {
        use FreezeEvent::*;
        use FreezeState::*;

        match (self, event) {
            (_, Released) => (Live, FreezeAction::Release),
            (_, FixRequested { complete: true }) => (Frozen, FreezeAction::Freeze),
            (Live | Pending, FixRequested { complete: false }) => (Pending, FreezeAction::None),
            (Frozen | FrozenPending, FixRequested { complete: false }) => (FrozenPending, FreezeAction::None),
            (Frozen, Recalculated) => (FrozenPending, FreezeAction::None),
            (Pending | FrozenPending, BakeCompleted) => (Frozen, FreezeAction::Freeze),
            (state, _) => (state, FreezeAction::None),
        }
    }

    /// A freeze is deferred until the bake completes
    pub fn is_pending(self) -> bool {
        matches!(self, FreezeState::Pending | FreezeState::FrozenPending)
    }

    /// A snapshot is currently shown
    pub fn is_frozen(self) -> bool {
        matches!(self, FreezeState::Frozen | FreezeState::FrozenPending)
    }
}

/// One unit of work in a frame: bake `point` using pool slot `slot`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotAssignment {
    pub slot: usize,
    pub point: usize,
}

/// Drives the bake a bounded number of points per frame
#[derive(Debug)]
pub struct BakeScheduler {
    state: BakeState,
    freeze: FreezeState,
    cursor: usize,
    order: ProcessingOrder,
    pool_size: usize,
}

impl BakeScheduler {
    /// Create a scheduler baking at most `pool_size` points per frame
    pub fn new(pool_size: usize) -> Self {
        Self {
            state: BakeState::Idle,
            freeze: FreezeState::Live,
            cursor: 0,
            order: ProcessingOrder::default(),
            pool_size: pool_size.max(1),
        }
    }

    pub fn state(&self) -> BakeState {
        self.state
    }

    pub fn freeze_state(&self) -> FreezeState {
        self.freeze
    }

    /// Position in the processing order of the next point to bake
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of points in the current processing order
    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self) -> &ProcessingOrder {
        &self.order
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn is_complete(&self) -> bool {
        self.state == BakeState::Complete
    }

    pub fn needs_prerender(&self) -> bool {
        self.state == BakeState::NeedsPrerender
    }

    /// Fraction of baked points in `[0, 1]`
    pub fn progress(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        (self.cursor as f32 / total as f32).min(1.0)
    }

    // --- Transitions ---

    fn apply(&mut self, event: BakeEvent) -> FreezeAction {
        let previous = self.state;
        self.state = previous.next(event, self.cursor, self.total());

        if previous != self.state {
            log::debug!("Visibility bake {:?} -> {:?}", previous, self.state);
        }
        if previous != BakeState::Complete && self.state == BakeState::Complete {
            log::info!("Visibility bake complete: {} points", self.total());
            return self.apply_freeze(FreezeEvent::BakeCompleted);
        }
        FreezeAction::None
    }

    fn apply_freeze(&mut self, event: FreezeEvent) -> FreezeAction {
        let (state, action) = self.freeze.next(event);
        self.freeze = state;
        action
    }

    /// Discard progress; the bake restarts from point 0 after a prerender
    pub fn invalidate(&mut self) {
        self.apply(BakeEvent::Invalidated);
    }

    /// Install a processing order for a new point count and restart
    pub fn set_order(&mut self, order: ProcessingOrder) {
        self.order = order;
        self.invalidate();
    }

    /// Drop the processing order and restart
    pub fn reset(&mut self) {
        self.set_order(ProcessingOrder::default());
        self.cursor = 0;
    }

    /// Record that the scene prerender was issued
    pub fn on_prerendered(&mut self) -> FreezeAction {
        self.cursor = 0;
        self.apply(BakeEvent::Prerendered)
    }

    /// Points to bake this frame, in pool-slot order
    pub fn plan_frame(&self) -> Vec<SlotAssignment> {
        if self.state != BakeState::Sampling {
            return Vec::new();
        }
        (0..self.pool_size)
            .zip(self.cursor..self.total())
            .map(|(slot, position)| SlotAssignment {
                slot,
                point: self.order.point_at(position),
            })
            .collect()
    }

    /// Record one baked point
    pub fn advance(&mut self) -> FreezeAction {
        if self.state != BakeState::Sampling {
            return FreezeAction::None;
        }
        self.cursor += 1;
        self.apply(BakeEvent::Advanced)
    }

    /// Restart the bake, keeping a shown snapshot until the new bake completes
    pub fn recalculate(&mut self) {
        self.invalidate();
        self.apply_freeze(FreezeEvent::Recalculated);
    }

    /// Freeze now if every point of the current order is baked, otherwise
    /// as soon as the bake completes.
    ///
    /// A fully baked overlay is frozen at once even if a restart is already
    /// scheduled.
    pub fn fix_current_frame(&mut self) -> FreezeAction {
        let complete = self.cursor == self.total();
        self.apply_freeze(FreezeEvent::FixRequested { complete })
    }

    /// Drop the snapshot and any deferred freeze
    pub fn release_fixed_frame(&mut self) -> FreezeAction {
        self.apply_freeze(FreezeEvent::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scheduler(points: usize, pool_size: usize) -> BakeScheduler {
        let mut s = BakeScheduler::new(pool_size);
        s.set_order(ProcessingOrder::rebuild(points, &mut StdRng::seed_from_u64(1)));
        s
    }

    /// One draw: prerender if needed, then bake the planned points
    fn frame(s: &mut BakeScheduler) -> Vec<FreezeAction> {
        let mut actions = Vec::new();
        if s.needs_prerender() {
            actions.push(s.on_prerendered());
        }
        for _ in s.plan_frame() {
            actions.push(s.advance());
        }
        actions.retain(|a| *a != FreezeAction::None);
        actions
    }

    #[test]
    fn test_bake_transition_table() {
        use BakeEvent::*;
        use BakeState::*;

        assert_eq!(Idle.next(Invalidated, 0, 5), NeedsPrerender);
        assert_eq!(Complete.next(Invalidated, 5, 5), NeedsPrerender);
        assert_eq!(Sampling.next(Invalidated, 2, 5), NeedsPrerender);
        assert_eq!(NeedsPrerender.next(Prerendered, 0, 5), Sampling);
        assert_eq!(NeedsPrerender.next(Prerendered, 0, 0), Complete);
        assert_eq!(Sampling.next(Advanced, 4, 5), Sampling);
        assert_eq!(Sampling.next(Advanced, 5, 5), Complete);
        assert_eq!(Idle.next(Advanced, 0, 5), Idle);
        assert_eq!(Complete.next(Prerendered, 5, 5), Complete);
    }

    #[test]
    fn test_freeze_transition_table() {
        use FreezeEvent::*;
        use FreezeState::*;

        assert_eq!(Live.next(FixRequested { complete: true }), (Frozen, FreezeAction::Freeze));
        assert_eq!(Live.next(FixRequested { complete: false }), (Pending, FreezeAction::None));
        assert_eq!(Pending.next(BakeCompleted), (Frozen, FreezeAction::Freeze));
        assert_eq!(Live.next(BakeCompleted), (Live, FreezeAction::None));
        assert_eq!(Frozen.next(Recalculated), (FrozenPending, FreezeAction::None));
        assert_eq!(Live.next(Recalculated), (Live, FreezeAction::None));
        assert_eq!(FrozenPending.next(BakeCompleted), (Frozen, FreezeAction::Freeze));
        assert_eq!(Pending.next(Released), (Live, FreezeAction::Release));
        assert_eq!(Frozen.next(Released), (Live, FreezeAction::Release));
        assert!(FrozenPending.is_pending() && FrozenPending.is_frozen());
        assert!(!Live.is_pending() && !Live.is_frozen());
    }

    #[test]
    fn test_ten_points_pool_one_completes_in_ten_frames() {
        let mut s = scheduler(10, 1);
        for i in 0..10 {
            assert!(!s.is_complete(), "complete early at frame {i}");
            frame(&mut s);
        }
        assert!(s.is_complete());
        assert_eq!(s.cursor(), 10);
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn test_pool_bounds_work_per_frame() {
        let mut s = scheduler(10, 4);
        s.on_prerendered();

        let plan = s.plan_frame();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.iter().map(|a| a.slot).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(plan[0].point, 0);
        for _ in &plan {
            s.advance();
        }

        frame(&mut s);
        assert_eq!(s.cursor(), 8);
        let tail = s.plan_frame();
        assert_eq!(tail.len(), 2);
        frame(&mut s);
        assert!(s.is_complete());
        assert!(s.plan_frame().is_empty());
    }

    #[test]
    fn test_plan_follows_processing_order() {
        let mut s = scheduler(6, 2);
        let expected: Vec<usize> = s.order().as_slice().iter().map(|&i| i as usize).collect();
        s.on_prerendered();

        let mut seen = Vec::new();
        while !s.is_complete() {
            for a in s.plan_frame() {
                seen.push(a.point);
                s.advance();
            }
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_zero_points_complete_after_prerender() {
        let mut s = scheduler(0, 1);
        assert!(s.needs_prerender());
        frame(&mut s);
        assert!(s.is_complete());
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn test_invalidate_restarts_from_zero() {
        let mut s = scheduler(10, 1);
        frame(&mut s);
        frame(&mut s);
        assert_eq!(s.cursor(), 2);

        s.invalidate();
        assert!(s.needs_prerender());
        assert!(s.plan_frame().is_empty());
        frame(&mut s);
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_stable_camera_does_not_restart() {
        let mut s = scheduler(5, 1);
        frame(&mut s);
        frame(&mut s);
        // No invalidation between frames: no prerender, cursor keeps going
        assert!(!s.needs_prerender());
        frame(&mut s);
        assert_eq!(s.cursor(), 3);
    }

    #[test]
    fn test_fix_deferred_until_complete() {
        let mut s = scheduler(3, 1);
        frame(&mut s);
        assert_eq!(s.fix_current_frame(), FreezeAction::None);
        assert_eq!(s.freeze_state(), FreezeState::Pending);

        assert!(frame(&mut s).is_empty());
        assert_eq!(s.cursor(), 2);
        assert_eq!(frame(&mut s), vec![FreezeAction::Freeze]);
        assert_eq!(s.cursor(), s.total());
        assert_eq!(s.freeze_state(), FreezeState::Frozen);

        // Already frozen: further frames do nothing
        assert!(frame(&mut s).is_empty());
    }

    #[test]
    fn test_fix_immediate_when_complete() {
        let mut s = scheduler(2, 2);
        frame(&mut s);
        assert!(s.is_complete());
        assert_eq!(s.fix_current_frame(), FreezeAction::Freeze);
        assert!(s.freeze_state().is_frozen());
    }

    #[test]
    fn test_fix_immediate_when_baked_but_restart_scheduled() {
        let mut s = scheduler(2, 1);
        frame(&mut s);
        frame(&mut s);
        assert!(s.is_complete());

        // Appearance change: restart pending, overlay still fully baked
        s.invalidate();
        assert!(s.needs_prerender());
        assert_eq!(s.fix_current_frame(), FreezeAction::Freeze);
        assert_eq!(s.freeze_state(), FreezeState::Frozen);

        // The rebake does not freeze a second time
        frame(&mut s);
        assert!(frame(&mut s).is_empty());
        assert!(s.is_complete());
    }

    #[test]
    fn test_release_clears_pending_freeze() {
        let mut s = scheduler(3, 1);
        frame(&mut s);
        s.fix_current_frame();
        assert_eq!(s.release_fixed_frame(), FreezeAction::Release);
        assert_eq!(s.freeze_state(), FreezeState::Live);

        frame(&mut s);
        assert!(frame(&mut s).is_empty());
        assert!(s.is_complete());
    }

    #[test]
    fn test_recalculate_refreezes_after_new_bake() {
        let mut s = scheduler(2, 1);
        frame(&mut s);
        frame(&mut s);
        s.fix_current_frame();
        assert_eq!(s.freeze_state(), FreezeState::Frozen);

        s.recalculate();
        assert!(s.needs_prerender());
        assert_eq!(s.freeze_state(), FreezeState::FrozenPending);

        assert!(frame(&mut s).is_empty());
        assert_eq!(frame(&mut s), vec![FreezeAction::Freeze]);
        assert_eq!(s.freeze_state(), FreezeState::Frozen);
    }

    #[test]
    fn test_recalculate_without_freeze_stays_live() {
        let mut s = scheduler(2, 1);
        frame(&mut s);
        s.recalculate();
        assert_eq!(s.freeze_state(), FreezeState::Live);
    }

    #[test]
    fn test_progress() {
        let mut s = scheduler(4, 1);
        assert_eq!(s.progress(), 0.0);
        frame(&mut s);
        assert!((s.progress() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_advance_outside_sampling_is_ignored() {
        let mut s = scheduler(4, 1);
        assert_eq!(s.advance(), FreezeAction::None);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_reset() {
        let mut s = scheduler(4, 1);
        frame(&mut s);
        s.reset();
        assert_eq!(s.total(), 0);
        assert_eq!(s.cursor(), 0);
        assert!(s.needs_prerender());
    }
}
