//! Notifications from an overlay to the renderer that draws it.

use crate::primitives::MaterialHandle;

/// Receives change notifications from an [`OverlayComponent`](crate::OverlayComponent).
///
/// All methods default to no-ops so a renderer adapter only implements what
/// it cares about. Calls happen synchronously on the thread that mutates the
/// overlay.
///
/// Material slot numbers are external: slot 0 is the line material, slot 1
/// the point material, and material group `n` occupies slot `n + 2`.
pub trait OverlayListener {
    /// Geometry or materials changed; render data must be rebuilt.
    fn render_state_dirty(&mut self) {}

    /// A primitive position changed; cached bounds are stale.
    fn bounds_dirty(&mut self) {}

    /// `slot` now maps to `material`.
    fn material_slot_assigned(&mut self, slot: u32, material: MaterialHandle) {
        let _ = (slot, material);
    }

    /// `slot` no longer has a material.
    fn material_slot_released(&mut self, slot: u32) {
        let _ = slot;
    }
}

/// Listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl OverlayListener for NoopListener {}

/// Host-side mirror of the material-slot protocol.
///
/// Keeps a slot-indexed material table in sync with the overlay so a
/// renderer can bind one material per batch, and counts the dirty
/// notifications it received.
#[derive(Debug, Clone, Default)]
pub struct MaterialBindingTable {
    slots: Vec<Option<MaterialHandle>>,
    render_dirty_count: u64,
    bounds_dirty_count: u64,
}

impl MaterialBindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Material bound to `slot`, if any.
    pub fn get(&self, slot: u32) -> Option<MaterialHandle> {
        self.slots.get(slot as usize).copied().flatten()
    }

    /// The full slot table. Its length is the highest slot ever assigned + 1.
    pub fn slots(&self) -> &[Option<MaterialHandle>] {
        &self.slots
    }

    /// Number of slots that currently have a material.
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of `render_state_dirty` notifications received.
    pub fn render_dirty_count(&self) -> u64 {
        self.render_dirty_count
    }

    /// Number of `bounds_dirty` notifications received.
    pub fn bounds_dirty_count(&self) -> u64 {
        self.bounds_dirty_count
    }
}

impl OverlayListener for MaterialBindingTable {
    fn render_state_dirty(&mut self) {
        self.render_dirty_count += 1;
    }

    fn bounds_dirty(&mut self) {
        self.bounds_dirty_count += 1;
    }

    fn material_slot_assigned(&mut self, slot: u32, material: MaterialHandle) {
        let idx = slot as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(material);
    }

    fn material_slot_released(&mut self, slot: u32) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            *entry = None;
        }
    }
}
