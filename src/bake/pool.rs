//! Fixed-size pool of cubemap render targets.

use crate::core::Result;

/// Cube render targets reused every frame.
///
/// Slots are allocated lazily on first use and live until
/// [`RenderTargetPool::release_all`]. The pool capacity bounds how many
/// points can be baked per frame.
#[derive(Debug)]
pub struct RenderTargetPool<C> {
    slots: Vec<Option<C>>,
    target_size: u32,
}

impl<C> RenderTargetPool<C> {
    /// Create a pool with `capacity` slots (at least one) of `target_size` faces
    pub fn new(capacity: usize, target_size: u32) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            target_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// Number of slots holding a render target
    pub fn allocated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn get(&self, index: usize) -> Option<&C> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Render target at `index`, created with `create` if the slot is empty.
    ///
    /// Panics if `index` is outside the pool.
    pub fn get_or_create<F>(&mut self, index: usize, create: F) -> Result<&C>
    where
        F: FnOnce(u32) -> Result<C>,
    {
        assert!(index < self.slots.len(), "render target slot {index} out of range");
        let slot = &mut self.slots[index];
        let target = match slot.take() {
            Some(target) => target,
            None => {
                log::debug!("Allocating visibility cubemap slot {} ({}px)", index, self.target_size);
                create(self.target_size)?
            }
        };
        let target: &C = slot.insert(target);
        Ok(target)
    }

    /// Drop every render target
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}
