//! Host-facing overlay: store, bounds and render data behind one API.

use std::sync::Arc;

use crate::batch::{BatchBuilder, OverlayRenderData};
use crate::bounds::{Aabb, BoundsCache};
use crate::error::Result;
use crate::listener::{NoopListener, OverlayListener};
use crate::math::Mat4;
use crate::primitives::{
    Color, Line, LineId, MaterialHandle, Point, PointId, Triangle, TriangleId,
};
use crate::store::{
    AddedTriangle, LINE_MATERIAL_SLOT, POINT_MATERIAL_SLOT, PrimitiveStore,
    RESERVED_MATERIAL_SLOTS, material_slot_for_group,
};

/// Configuration for an [`OverlayComponent`].
///
/// # Example
///
/// ```
/// use redlilium_overlay::{MaterialHandle, OverlayDescriptor};
///
/// let desc = OverlayDescriptor::new(MaterialHandle(1), MaterialHandle(2))
///     .with_label("selection_overlay")
///     .with_line_capacity(256);
/// assert_eq!(desc.label.as_deref(), Some("selection_overlay"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDescriptor {
    /// Material for the line batch (slot 0).
    pub line_material: MaterialHandle,
    /// Material for the point batch (slot 1).
    pub point_material: MaterialHandle,
    /// Optional label used in log messages.
    pub label: Option<String>,
    /// Number of line slots to reserve up front.
    pub line_capacity: usize,
    /// Number of point slots to reserve up front.
    pub point_capacity: usize,
}

impl OverlayDescriptor {
    /// Create a descriptor with the given line and point materials.
    pub fn new(line_material: MaterialHandle, point_material: MaterialHandle) -> Self {
        Self {
            line_material,
            point_material,
            label: None,
            line_capacity: 0,
            point_capacity: 0,
        }
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Reserve slots for `capacity` lines.
    pub fn with_line_capacity(mut self, capacity: usize) -> Self {
        self.line_capacity = capacity;
        self
    }

    /// Reserve slots for `capacity` points.
    pub fn with_point_capacity(mut self, capacity: usize) -> Self {
        self.point_capacity = capacity;
        self
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("overlay")
    }
}

/// An overlay of debug lines, points and triangles.
///
/// Wraps a [`PrimitiveStore`] and keeps an [`OverlayListener`] informed:
///
/// - every successful mutation reports `render_state_dirty`
/// - add, insert, remove and clear also report `bounds_dirty`; color,
///   thickness and size changes do not
/// - creating a material group assigns its material slot, destroying one
///   releases it
///
/// Render data is rebuilt lazily by [`render_data`](Self::render_data) and
/// cached until the next mutation.
pub struct OverlayComponent<L: OverlayListener = NoopListener> {
    descriptor: OverlayDescriptor,
    store: PrimitiveStore,
    bounds: BoundsCache,
    listener: L,
    render_data: Option<Arc<OverlayRenderData>>,
}

impl OverlayComponent<NoopListener> {
    /// Creates an overlay that reports to no one.
    pub fn new(descriptor: OverlayDescriptor) -> Self {
        Self::with_listener(descriptor, NoopListener)
    }
}

impl<L: OverlayListener> OverlayComponent<L> {
    /// Creates an overlay that reports changes to `listener`.
    ///
    /// The line and point material slots are announced immediately.
    pub fn with_listener(descriptor: OverlayDescriptor, mut listener: L) -> Self {
        listener.material_slot_assigned(LINE_MATERIAL_SLOT, descriptor.line_material);
        listener.material_slot_assigned(POINT_MATERIAL_SLOT, descriptor.point_material);
        let store =
            PrimitiveStore::with_capacity(descriptor.line_capacity, descriptor.point_capacity);
        Self {
            descriptor,
            store,
            bounds: BoundsCache::new(),
            listener,
            render_data: None,
        }
    }

    pub fn descriptor(&self) -> &OverlayDescriptor {
        &self.descriptor
    }

    /// Read access to the underlying primitives.
    pub fn store(&self) -> &PrimitiveStore {
        &self.store
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    // --- Materials ---

    /// Changes the material of the line batch.
    pub fn set_line_material(&mut self, material: MaterialHandle) {
        self.descriptor.line_material = material;
        self.listener.material_slot_assigned(LINE_MATERIAL_SLOT, material);
        self.mark_render_dirty();
    }

    /// Changes the material of the point batch.
    pub fn set_point_material(&mut self, material: MaterialHandle) {
        self.descriptor.point_material = material;
        self.listener.material_slot_assigned(POINT_MATERIAL_SLOT, material);
        self.mark_render_dirty();
    }

    /// Number of material slots the renderer must provide.
    ///
    /// This is a high-water mark: it does not shrink when a material group
    /// is destroyed, only on [`clear`](Self::clear).
    pub fn material_slot_count(&self) -> u32 {
        self.store.material_slot_count()
    }

    /// Material bound to an external slot number.
    pub fn material_for_slot(&self, slot: u32) -> Option<MaterialHandle> {
        match slot {
            LINE_MATERIAL_SLOT => Some(self.descriptor.line_material),
            POINT_MATERIAL_SLOT => Some(self.descriptor.point_material),
            _ => self.store.group_material(slot - RESERVED_MATERIAL_SLOTS),
        }
    }

    // --- Lines ---

    pub fn add_line(&mut self, line: Line) -> LineId {
        let id = self.store.add_line(line);
        self.mark_geometry_dirty();
        id
    }

    /// Adds a line at a previously issued ID.
    ///
    /// # Errors
    ///
    /// Returns [`HandleInUse`](crate::OverlayError::HandleInUse) if `id` is occupied.
    pub fn insert_line(&mut self, id: LineId, line: Line) -> Result<()> {
        self.checked(|store| store.insert_line(id, line))?;
        self.mark_geometry_dirty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn set_line_color(&mut self, id: LineId, color: Color) -> Result<()> {
        self.checked(|store| store.set_line_color(id, color))?;
        self.mark_render_dirty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn set_line_thickness(&mut self, id: LineId, thickness: f32) -> Result<()> {
        self.checked(|store| store.set_line_thickness(id, thickness))?;
        self.mark_render_dirty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn remove_line(&mut self, id: LineId) -> Result<Line> {
        let line = self.checked(|store| store.remove_line(id))?;
        self.mark_geometry_dirty();
        Ok(line)
    }

    pub fn is_line_valid(&self, id: LineId) -> bool {
        self.store.is_line_valid(id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.store.line(id)
    }

    // --- Points ---

    pub fn add_point(&mut self, point: Point) -> PointId {
        let id = self.store.add_point(point);
        self.mark_geometry_dirty();
        id
    }

    /// Adds a point at a previously issued ID.
    ///
    /// # Errors
    ///
    /// Returns [`HandleInUse`](crate::OverlayError::HandleInUse) if `id` is occupied.
    pub fn insert_point(&mut self, id: PointId, point: Point) -> Result<()> {
        self.checked(|store| store.insert_point(id, point))?;
        self.mark_geometry_dirty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn set_point_color(&mut self, id: PointId, color: Color) -> Result<()> {
        self.checked(|store| store.set_point_color(id, color))?;
        self.mark_render_dirty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn set_point_size(&mut self, id: PointId, size: f32) -> Result<()> {
        self.checked(|store| store.set_point_size(id, size))?;
        self.mark_render_dirty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn remove_point(&mut self, id: PointId) -> Result<Point> {
        let point = self.checked(|store| store.remove_point(id))?;
        self.mark_geometry_dirty();
        Ok(point)
    }

    pub fn is_point_valid(&self, id: PointId) -> bool {
        self.store.is_point_valid(id)
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.store.point(id)
    }

    // --- Triangles ---

    /// Returns the group index for `material`, creating the group (and
    /// announcing its slot) if needed.
    ///
    /// A group created here with no triangles reserves its slot: it draws
    /// nothing, and is released once a triangle has been added to it and the
    /// last one removed, or on [`clear`](Self::clear).
    pub fn find_or_add_material_group(&mut self, material: MaterialHandle) -> u32 {
        let entry = self.store.find_or_add_material_group(material);
        if entry.created {
            self.listener
                .material_slot_assigned(material_slot_for_group(entry.index), material);
            self.mark_render_dirty();
        }
        entry.index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) -> TriangleId {
        let added = self.store.add_triangle(triangle);
        self.after_triangle_added(added, triangle.material);
        added.id
    }

    /// Adds a triangle at a previously issued ID.
    ///
    /// # Errors
    ///
    /// Returns [`HandleInUse`](crate::OverlayError::HandleInUse) if `id` is occupied.
    pub fn insert_triangle(&mut self, id: TriangleId, triangle: Triangle) -> Result<()> {
        let added = self.checked(|store| store.insert_triangle(id, triangle))?;
        self.after_triangle_added(added, triangle.material);
        Ok(())
    }

    /// Removes a triangle; the material slot is released if its group empties.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandle`](crate::OverlayError::InvalidHandle) if `id` is not live.
    pub fn remove_triangle(&mut self, id: TriangleId) -> Result<Triangle> {
        let removed = self.checked(|store| store.remove_triangle(id))?;
        if let Some(index) = removed.released_group {
            self.listener
                .material_slot_released(material_slot_for_group(index));
        }
        self.mark_geometry_dirty();
        Ok(removed.triangle)
    }

    pub fn is_triangle_valid(&self, id: TriangleId) -> bool {
        self.store.is_triangle_valid(id)
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.store.triangle(id)
    }

    fn after_triangle_added(&mut self, added: AddedTriangle, material: MaterialHandle) {
        if added.group.created {
            self.listener
                .material_slot_assigned(material_slot_for_group(added.group.index), material);
        }
        self.mark_geometry_dirty();
    }

    // --- Whole overlay ---

    /// Removes every primitive and releases every triangle material slot.
    pub fn clear(&mut self) {
        let released = self.store.clear();
        for index in &released {
            self.listener
                .material_slot_released(material_slot_for_group(*index));
        }
        log::debug!(
            "Cleared {} ({} material groups released)",
            self.descriptor.label(),
            released.len()
        );
        self.mark_geometry_dirty();
    }

    pub fn line_count(&self) -> usize {
        self.store.line_count()
    }

    pub fn point_count(&self) -> usize {
        self.store.point_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.store.triangle_count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // --- Bounds ---

    /// Local-space bounds of every primitive. Empty when the overlay is.
    pub fn bounds(&mut self) -> Aabb {
        self.bounds.get(&self.store)
    }

    /// Bounds after applying the host's local-to-world transform.
    pub fn world_bounds(&mut self, local_to_world: &Mat4) -> Aabb {
        self.bounds().transformed(local_to_world)
    }

    /// How many times the bounds were recomputed.
    pub fn bounds_recompute_count(&self) -> u64 {
        self.bounds.recompute_count()
    }

    // --- Render data ---

    /// Whether the next [`render_data`](Self::render_data) call will rebuild.
    pub fn is_render_state_dirty(&self) -> bool {
        self.render_data.is_none()
    }

    /// Returns the current render data, rebuilding it if anything changed.
    pub fn render_data(&mut self) -> Arc<OverlayRenderData> {
        if let Some(data) = &self.render_data {
            return Arc::clone(data);
        }
        let data = Arc::new(self.build_render_data());
        self.render_data = Some(Arc::clone(&data));
        data
    }

    /// Builds fresh render data without touching the cache.
    pub fn build_render_data(&self) -> OverlayRenderData {
        BatchBuilder::new(
            &self.store,
            self.descriptor.line_material,
            self.descriptor.point_material,
        )
        .build()
    }

    // --- Internals ---

    /// Runs a store operation, logging handle errors before returning them.
    fn checked<T>(&mut self, op: impl FnOnce(&mut PrimitiveStore) -> Result<T>) -> Result<T> {
        op(&mut self.store).inspect_err(|err| {
            log::warn!("{}: {}", self.descriptor.label(), err);
        })
    }

    fn mark_render_dirty(&mut self) {
        self.render_data = None;
        self.listener.render_state_dirty();
    }

    fn mark_geometry_dirty(&mut self) {
        self.bounds.invalidate();
        self.listener.bounds_dirty();
        self.mark_render_dirty();
    }
}

impl<L: OverlayListener + std::fmt::Debug> std::fmt::Debug for OverlayComponent<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayComponent")
            .field("label", &self.descriptor.label())
            .field("lines", &self.store.line_count())
            .field("points", &self.store.point_count())
            .field("triangles", &self.store.triangle_count())
            .field("material_slots", &self.store.material_slot_count())
            .field("listener", &self.listener)
            .finish()
    }
}
